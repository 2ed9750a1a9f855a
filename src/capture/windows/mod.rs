//! Windows capture implementations
//!
//! Uses a low-level mouse hook for raw motion and the cursor APIs from
//! user32 for reading and placing the pointer.

pub mod input;

pub use input::*;
