//! Raw input capture
//!
//! Types describing pointer motion and the hook handler that turns raw
//! motion into target-position updates for the smoothing engine.

pub mod capture;
pub mod types;

pub use capture::InputCapture;
pub use types::{CursorPoint, HookDecision, MoveEvent, ScreenBounds};
