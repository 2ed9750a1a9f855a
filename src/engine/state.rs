//! State shared between the hook callback and the smoothing worker
//!
//! Target and smoothed positions live behind one mutex; critical sections
//! are arithmetic plus a clamp and never touch the device. The `running` and
//! `enabled` flags are lock-free so either side can read them at any time.

use crate::capture::input::types::{CursorPoint, ScreenBounds};
use crate::processing::filter::LowPassFilter;
use crate::processing::vector::Position;
use parking_lot::{Condvar, Mutex as ParkingMutex};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Target/smoothed pair plus the bounds they are clamped to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Positions {
    pub filter: LowPassFilter,
    pub bounds: ScreenBounds,
}

impl Positions {
    pub fn new(bounds: ScreenBounds, cursor: CursorPoint) -> Self {
        Self {
            filter: LowPassFilter::new(Position::from(cursor).clamped(bounds)),
            bounds,
        }
    }

    /// Add a raw delta to the target and clamp it to the screen
    pub fn accumulate(&mut self, delta: Position) -> Position {
        self.filter.target = (self.filter.target + delta).clamped(self.bounds);
        self.filter.target
    }

    /// Put target and smoothed on the real cursor
    pub fn resync(&mut self, cursor: CursorPoint) {
        self.filter.reset(Position::from(cursor).clamped(self.bounds));
    }
}

/// Running counters, readable without the position lock
#[derive(Debug, Default)]
pub struct EngineStats {
    pub events_applied: AtomicU64,
    pub events_injected: AtomicU64,
    pub ticks: AtomicU64,
    pub cursor_sets: AtomicU64,
    pub device_errors: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub events_applied: u64,
    pub events_injected: u64,
    pub ticks: u64,
    pub cursor_sets: u64,
    pub device_errors: u64,
}

impl EngineStats {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            events_applied: self.events_applied.load(Ordering::Relaxed),
            events_injected: self.events_injected.load(Ordering::Relaxed),
            ticks: self.ticks.load(Ordering::Relaxed),
            cursor_sets: self.cursor_sets.load(Ordering::Relaxed),
            device_errors: self.device_errors.load(Ordering::Relaxed),
        }
    }
}

pub struct EngineShared {
    positions: ParkingMutex<Positions>,
    running: AtomicBool,
    enabled: AtomicBool,
    shutdown: ParkingMutex<bool>,
    wake: Condvar,
    pub stats: EngineStats,
}

impl EngineShared {
    pub fn new(bounds: ScreenBounds, cursor: CursorPoint) -> Self {
        Self {
            positions: ParkingMutex::new(Positions::new(bounds, cursor)),
            running: AtomicBool::new(false),
            enabled: AtomicBool::new(false),
            shutdown: ParkingMutex::new(false),
            wake: Condvar::new(),
            stats: EngineStats::default(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Run `f` with the position lock held. Keep `f` to arithmetic.
    pub fn with_positions<R>(&self, f: impl FnOnce(&mut Positions) -> R) -> R {
        f(&mut self.positions.lock())
    }

    pub fn positions(&self) -> Positions {
        *self.positions.lock()
    }

    /// Replace bounds, seed both positions from the cursor and turn smoothing on
    pub fn seed_and_enable(&self, bounds: ScreenBounds, cursor: CursorPoint) {
        let mut positions = self.positions.lock();
        *positions = Positions::new(bounds, cursor);
        self.enabled.store(true, Ordering::SeqCst);
    }

    /// Seed from the cursor and turn smoothing on in one critical section,
    /// so a concurrent disabled-resync cannot overwrite the fresh seed.
    pub fn reseed_and_enable(&self, cursor: CursorPoint) {
        let mut positions = self.positions.lock();
        positions.resync(cursor);
        self.enabled.store(true, Ordering::SeqCst);
    }

    /// Track the real cursor while smoothing is off. Returns false if
    /// smoothing was re-enabled in the meantime and nothing was written.
    pub fn resync_if_disabled(&self, cursor: CursorPoint) -> bool {
        let mut positions = self.positions.lock();
        if self.enabled.load(Ordering::SeqCst) {
            return false;
        }
        positions.resync(cursor);
        true
    }

    /// Clear a previous shutdown request before a worker starts
    pub fn arm_shutdown(&self) {
        *self.shutdown.lock() = false;
    }

    /// Wake the worker so it notices `running == false` without waiting out its tick
    pub fn request_shutdown(&self) {
        let mut stop = self.shutdown.lock();
        *stop = true;
        self.wake.notify_all();
    }

    /// Wait one tick interval. Returns true if shutdown was requested.
    pub fn wait_tick(&self, interval: Duration) -> bool {
        let deadline = Instant::now() + interval;
        let mut stop = self.shutdown.lock();
        while !*stop {
            if self.wake.wait_until(&mut stop, deadline).timed_out() {
                break;
            }
        }
        *stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn shared() -> EngineShared {
        EngineShared::new(ScreenBounds::new(1920, 1080), CursorPoint::new(500, 500))
    }

    #[test]
    fn test_accumulate_clamps_every_update() {
        let shared = shared();
        let deltas = [
            Position::new(50.0, 0.0),
            Position::new(-10_000.0, 3.0),
            Position::new(0.0, 99_999.0),
            Position::new(1_919.0, -1.0),
            Position::new(7.5, -2_000.0),
        ];

        for delta in deltas {
            let target = shared.with_positions(|p| p.accumulate(delta));
            assert!((0.0..=1919.0).contains(&target.x), "x out of range: {}", target.x);
            assert!((0.0..=1079.0).contains(&target.y), "y out of range: {}", target.y);
        }
        assert_eq!(shared.positions().filter.target, Position::new(1919.0, 0.0));
    }

    #[test]
    fn test_seed_clamps_offscreen_cursor() {
        let shared = shared();
        shared.seed_and_enable(ScreenBounds::new(800, 600), CursorPoint::new(-40, 900));
        assert!(shared.is_enabled());
        let positions = shared.positions();
        assert_eq!(positions.filter.target, Position::new(0.0, 599.0));
        assert_eq!(positions.filter.smoothed, positions.filter.target);
    }

    #[test]
    fn test_resync_skipped_once_enabled() {
        let shared = shared();
        assert!(shared.resync_if_disabled(CursorPoint::new(10, 20)));
        assert_eq!(shared.positions().filter.smoothed, Position::new(10.0, 20.0));

        shared.reseed_and_enable(CursorPoint::new(30, 40));
        assert!(shared.is_enabled());
        assert!(!shared.resync_if_disabled(CursorPoint::new(0, 0)));
        assert_eq!(shared.positions().filter.target, Position::new(30.0, 40.0));
    }

    #[test]
    fn test_wait_tick_times_out_without_shutdown() {
        let shared = shared();
        let started = Instant::now();
        assert!(!shared.wait_tick(Duration::from_millis(5)));
        assert!(started.elapsed() >= Duration::from_millis(5));
    }

    #[test]
    fn test_shutdown_wakes_waiter_early() {
        let shared = Arc::new(shared());
        let waiter = {
            let shared = shared.clone();
            thread::spawn(move || {
                let started = Instant::now();
                let stopped = shared.wait_tick(Duration::from_secs(30));
                (stopped, started.elapsed())
            })
        };

        thread::sleep(Duration::from_millis(20));
        shared.request_shutdown();
        let (stopped, elapsed) = waiter.join().unwrap();
        assert!(stopped);
        assert!(elapsed < Duration::from_secs(5), "waiter took {:?}", elapsed);

        shared.arm_shutdown();
        assert!(!shared.wait_tick(Duration::from_millis(1)));
    }
}
