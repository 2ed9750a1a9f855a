use serde::{Deserialize, Serialize};

/// Integer pixel position as reported to or accepted by the pointer device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CursorPoint {
    pub x: i32,
    pub y: i32,
}

impl CursorPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Primary screen size in pixels, sampled once when the engine starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenBounds {
    pub width: u32,
    pub height: u32,
}

impl ScreenBounds {
    /// Degenerate sizes are widened to a single pixel so clamping stays well-defined.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn max_x(&self) -> f64 {
        self.width.saturating_sub(1) as f64
    }

    pub fn max_y(&self) -> f64 {
        self.height.saturating_sub(1) as f64
    }

    pub fn clamp_point(&self, point: CursorPoint) -> CursorPoint {
        CursorPoint::new(
            point.x.clamp(0, self.width.saturating_sub(1) as i32),
            point.y.clamp(0, self.height.saturating_sub(1) as i32),
        )
    }
}

/// A raw pointer-move notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveEvent {
    /// Position the OS intends to apply if the event is not suppressed
    pub position: CursorPoint,
    /// Set when the motion was produced by a synthetic cursor-set call
    pub injected: bool,
}

impl MoveEvent {
    pub fn physical(position: CursorPoint) -> Self {
        Self {
            position,
            injected: false,
        }
    }

    pub fn injected(position: CursorPoint) -> Self {
        Self {
            position,
            injected: true,
        }
    }
}

/// What the hook tells the OS to do with a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookDecision {
    /// Continue default handling
    PassThrough,
    /// Swallow the event; the default cursor placement does not happen
    Suppress,
}

impl HookDecision {
    pub fn is_suppressed(self) -> bool {
        matches!(self, HookDecision::Suppress)
    }
}
