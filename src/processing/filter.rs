//! One-pole low-pass filter for cursor positions
//!
//! Each step moves the smoothed position a fixed fraction of the way toward
//! the target, which gives geometric convergence:
//! `|target - s_n| = |target - s_0| * (1 - factor)^n`.
//! Close to the target the filter stops interpolating and snaps, so floating
//! residue never keeps the cursor creeping forever.

use crate::config::SmoothingConfig;
use crate::processing::vector::Position;

/// What a single filter step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStep {
    /// Moved a fraction of the way toward the target
    Interpolated,
    /// Residual was under the deadband and got discarded
    Snapped,
    /// Already at the target
    Settled,
}

impl FilterStep {
    pub fn moved(self) -> bool {
        !matches!(self, FilterStep::Settled)
    }
}

/// Advance `smoothed` one tick toward `target`
pub fn step_toward(smoothed: &mut Position, target: Position, config: &SmoothingConfig) -> FilterStep {
    let diff = target - *smoothed;
    let dist = diff.magnitude();

    if dist > config.deadband {
        *smoothed += diff * config.smoothing_factor;
        FilterStep::Interpolated
    } else if dist > config.snap_threshold {
        *smoothed = target;
        FilterStep::Snapped
    } else {
        FilterStep::Settled
    }
}

/// Target and smoothed position pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowPassFilter {
    pub target: Position,
    pub smoothed: Position,
}

impl LowPassFilter {
    /// Create a filter resting at `position`
    pub fn new(position: Position) -> Self {
        Self {
            target: position,
            smoothed: position,
        }
    }

    pub fn step(&mut self, config: &SmoothingConfig) -> FilterStep {
        step_toward(&mut self.smoothed, self.target, config)
    }

    /// Put both positions at `position` with no pending motion
    pub fn reset(&mut self, position: Position) {
        self.target = position;
        self.smoothed = position;
    }
}
