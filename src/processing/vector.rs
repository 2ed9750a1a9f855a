//! Screen-space vector math for cursor positions

use crate::capture::input::types::{CursorPoint, ScreenBounds};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Sub};

/// A 2D floating-point point in screen coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length when treated as a vector
    pub fn magnitude(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Clamp into `[0, width-1] x [0, height-1]`
    pub fn clamped(self, bounds: ScreenBounds) -> Self {
        Self {
            x: self.x.clamp(0.0, bounds.max_x()),
            y: self.y.clamp(0.0, bounds.max_y()),
        }
    }

    /// Round to the nearest integer pixel
    pub fn round(self) -> CursorPoint {
        CursorPoint::new(self.x.round() as i32, self.y.round() as i32)
    }
}

impl From<CursorPoint> for Position {
    fn from(point: CursorPoint) -> Self {
        Self::new(point.x as f64, point.y as f64)
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Position {
    fn add_assign(&mut self, rhs: Position) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Position {
    type Output = Position;

    fn mul(self, scale: f64) -> Position {
        Position::new(self.x * scale, self.y * scale)
    }
}
