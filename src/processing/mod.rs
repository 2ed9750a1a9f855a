//! Processing module for cursor motion
//!
//! This module contains the vector math and the low-pass filter the
//! smoothing worker applies on every tick.

pub mod filter;
pub mod vector;

pub use filter::{step_toward, FilterStep, LowPassFilter};
pub use vector::Position;
