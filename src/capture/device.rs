//! Pointer device capability
//!
//! Defines the interface the smoothing engine uses to talk to the host OS:
//! reading and placing the cursor, querying screen bounds, and subscribing
//! to raw move notifications with the option of suppressing them.

use crate::capture::input::types::{CursorPoint, HookDecision, MoveEvent, ScreenBounds};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while talking to the pointer device
#[derive(Error, Debug)]
pub enum PointerError {
    #[error("Failed to install input hook: {0}")]
    HookInstall(String),

    #[error("Unknown subscription: {0}")]
    UnknownSubscription(SubscriptionId),

    #[error("Failed to read cursor position: {0}")]
    ReadFailed(String),

    #[error("Failed to set cursor position: {0}")]
    WriteFailed(String),

    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Platform error: {0}")]
    PlatformError(String),

    #[error("Pointer smoothing is not supported on this platform")]
    Unsupported,
}

/// Result type for pointer device operations
pub type PointerResult<T> = Result<T, PointerError>;

/// Identity of one hook subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

/// Receiver of raw move notifications
///
/// Called on the OS hook-dispatch context. Implementations must return
/// quickly: the OS drops hooks that block past its callback timeout.
pub trait MoveHandler: Send + Sync {
    fn on_move(&self, event: &MoveEvent) -> HookDecision;
}

/// Trait for pointer devices
///
/// Each platform supplies an adapter. The engine core only ever talks to
/// this trait, so it stays portable and testable.
pub trait PointerDevice: Send + Sync {
    /// Current actual cursor position
    fn cursor_position(&self) -> PointerResult<CursorPoint>;

    /// Move the cursor. Motion produced here is reported back as injected.
    fn set_cursor_position(&self, point: CursorPoint) -> PointerResult<()>;

    /// Size of the primary screen
    fn screen_bounds(&self) -> PointerResult<ScreenBounds>;

    /// Start delivering raw move notifications to `handler`
    fn subscribe(&self, handler: Arc<dyn MoveHandler>) -> PointerResult<SubscriptionId>;

    /// Stop delivering notifications for `id`
    fn unsubscribe(&self, id: SubscriptionId) -> PointerResult<()>;

    /// Ask the OS to schedule the calling thread with elevated priority.
    /// Best effort; the default does nothing.
    fn elevate_current_thread(&self) {}
}
