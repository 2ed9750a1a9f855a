//! Concurrent smoothing engine
//!
//! Two execution contexts meet here: the OS hook callback, which folds raw
//! motion into the target, and the worker thread, which filters the target
//! and places the cursor. The controller owns both lifecycles.

pub mod controller;
pub mod state;
pub mod worker;

pub use controller::{EngineStatus, ModeState, MouseSmoother};
pub use state::{EngineShared, StatsSnapshot};
pub use worker::{SmoothingWorker, TickOutcome};
