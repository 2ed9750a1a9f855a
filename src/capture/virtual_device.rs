//! In-memory pointer device
//!
//! Behaves like an OS pointer: physical moves are offered to subscribed
//! hooks first and only applied when nobody suppresses them, and cursor-set
//! calls are reported back to the hooks as injected motion. Used to drive
//! the engine without a real display, and to inject device failures.

use crate::capture::device::{MoveHandler, PointerDevice, PointerError, PointerResult, SubscriptionId};
use crate::capture::input::types::{CursorPoint, HookDecision, MoveEvent, ScreenBounds};
use crate::capture::registry::HookRegistry;
use parking_lot::Mutex as ParkingMutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

pub struct VirtualPointer {
    cursor: ParkingMutex<CursorPoint>,
    bounds: ScreenBounds,
    registry: HookRegistry,

    fail_subscribe: AtomicBool,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,

    subscribe_calls: AtomicU64,
    set_calls: AtomicU64,
    elevate_calls: AtomicU64,
}

impl VirtualPointer {
    pub fn new(bounds: ScreenBounds, cursor: CursorPoint) -> Self {
        Self {
            cursor: ParkingMutex::new(bounds.clamp_point(cursor)),
            bounds,
            registry: HookRegistry::new(),
            fail_subscribe: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            subscribe_calls: AtomicU64::new(0),
            set_calls: AtomicU64::new(0),
            elevate_calls: AtomicU64::new(0),
        }
    }

    /// Simulate the physical device moving by `(dx, dy)`.
    ///
    /// Hooks see the position the OS would apply; the cursor only moves if
    /// the event is passed through.
    pub fn move_physical(&self, dx: i32, dy: i32) -> HookDecision {
        let current = *self.cursor.lock();
        let proposed = self
            .bounds
            .clamp_point(CursorPoint::new(current.x + dx, current.y + dy));
        let decision = self.registry.dispatch(&MoveEvent::physical(proposed));
        if !decision.is_suppressed() {
            *self.cursor.lock() = proposed;
        }
        decision
    }

    /// Move the cursor from outside any hook, e.g. another input source
    /// while smoothing is disabled.
    pub fn warp(&self, point: CursorPoint) {
        *self.cursor.lock() = self.bounds.clamp_point(point);
    }

    /// Position without going through failure injection
    pub fn current(&self) -> CursorPoint {
        *self.cursor.lock()
    }

    pub fn fail_subscribe(&self, fail: bool) {
        self.fail_subscribe.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    pub fn subscribe_calls(&self) -> u64 {
        self.subscribe_calls.load(Ordering::SeqCst)
    }

    pub fn set_calls(&self) -> u64 {
        self.set_calls.load(Ordering::SeqCst)
    }

    pub fn elevate_calls(&self) -> u64 {
        self.elevate_calls.load(Ordering::SeqCst)
    }
}

impl PointerDevice for VirtualPointer {
    fn cursor_position(&self) -> PointerResult<CursorPoint> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(PointerError::ReadFailed("virtual read failure".to_string()));
        }
        Ok(*self.cursor.lock())
    }

    fn set_cursor_position(&self, point: CursorPoint) -> PointerResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PointerError::WriteFailed("virtual write failure".to_string()));
        }
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        let point = self.bounds.clamp_point(point);
        *self.cursor.lock() = point;
        // The OS reports synthetic placement to low-level hooks as injected motion
        self.registry.dispatch(&MoveEvent::injected(point));
        Ok(())
    }

    fn screen_bounds(&self) -> PointerResult<ScreenBounds> {
        Ok(self.bounds)
    }

    fn subscribe(&self, handler: Arc<dyn MoveHandler>) -> PointerResult<SubscriptionId> {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_subscribe.load(Ordering::SeqCst) {
            return Err(PointerError::HookInstall("virtual hook refused".to_string()));
        }
        let (id, _) = self.registry.register(handler);
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> PointerResult<()> {
        self.registry.unregister(id).map(|_| ())
    }

    fn elevate_current_thread(&self) {
        self.elevate_calls.fetch_add(1, Ordering::SeqCst);
    }
}
