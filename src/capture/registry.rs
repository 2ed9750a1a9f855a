//! Hook subscription registry
//!
//! OS hook callbacks carry no user data, so an adapter needs a way to reach
//! the handlers that subscribed through it. The registry maps each
//! subscription id to its handler and fans notifications out to them.

use crate::capture::device::{MoveHandler, PointerError, PointerResult, SubscriptionId};
use crate::capture::input::types::{HookDecision, MoveEvent};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Default)]
pub struct HookRegistry {
    next_id: AtomicU64,
    handlers: RwLock<BTreeMap<SubscriptionId, Arc<dyn MoveHandler>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, returning its id and whether it is the first one
    pub fn register(&self, handler: Arc<dyn MoveHandler>) -> (SubscriptionId, bool) {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let mut handlers = self.handlers.write();
        let first = handlers.is_empty();
        handlers.insert(id, handler);
        (id, first)
    }

    /// Remove a handler, returning whether the registry is now empty
    pub fn unregister(&self, id: SubscriptionId) -> PointerResult<bool> {
        let mut handlers = self.handlers.write();
        if handlers.remove(&id).is_none() {
            return Err(PointerError::UnknownSubscription(id));
        }
        Ok(handlers.is_empty())
    }

    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }

    /// Deliver an event to every handler. Suppressed if any handler suppresses it.
    ///
    /// A panicking handler is treated as pass-through so nothing unwinds into
    /// the OS callback.
    pub fn dispatch(&self, event: &MoveEvent) -> HookDecision {
        let handlers = self.handlers.read();
        let mut decision = HookDecision::PassThrough;
        for (id, handler) in handlers.iter() {
            match catch_unwind(AssertUnwindSafe(|| handler.on_move(event))) {
                Ok(HookDecision::Suppress) => decision = HookDecision::Suppress,
                Ok(HookDecision::PassThrough) => {}
                Err(_) => {
                    tracing::error!("Move handler {} panicked, passing event through", id);
                }
            }
        }
        decision
    }
}
