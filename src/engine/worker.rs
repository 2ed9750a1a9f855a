//! Smoothing worker
//!
//! Runs on its own thread at a fixed tick interval. While smoothing is on it
//! advances the low-pass filter and places the real cursor on the rounded
//! result; while it is off it keeps target and smoothed glued to the real
//! cursor so turning smoothing back on never jumps.

use crate::capture::device::{PointerDevice, PointerError};
use crate::capture::input::types::CursorPoint;
use crate::config::{LiveConfig, SmoothingConfig};
use crate::engine::state::{EngineShared, EngineStats};
use std::cell::Cell;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Name of the worker thread
pub const WORKER_THREAD_NAME: &str = "cursor-smoothing";

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Smoothed position already at target and the cursor is known to be there
    Idle,
    /// Filter advanced but the cursor is already on that pixel
    Unchanged,
    /// Cursor was moved to this pixel
    Placed(CursorPoint),
    /// Smoothing off; state copied from the real cursor
    Resynced,
    /// A device call failed; the next tick starts over from the real cursor
    DeviceError,
}

pub struct SmoothingWorker {
    shared: Arc<EngineShared>,
    device: Arc<dyn PointerDevice>,
    config: Arc<LiveConfig>,
    /// Pixel the cursor was last confirmed on; cleared by any device failure
    placed: Cell<Option<CursorPoint>>,
}

impl SmoothingWorker {
    pub fn new(
        shared: Arc<EngineShared>,
        device: Arc<dyn PointerDevice>,
        config: Arc<LiveConfig>,
    ) -> Self {
        Self {
            shared,
            device,
            config,
            placed: Cell::new(None),
        }
    }

    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || self.run())
    }

    fn run(&self) {
        self.device.elevate_current_thread();
        tracing::info!(
            "Smoothing worker started (tick={:?})",
            self.config.get().tick_interval()
        );

        while self.shared.is_running() {
            // Re-read every tick so live config changes apply immediately
            let config = self.config.get();
            self.tick(&config);
            if self.shared.wait_tick(config.tick_interval()) {
                break;
            }
        }

        tracing::info!(
            "Smoothing worker stopped after {} ticks",
            self.shared.stats.snapshot().ticks
        );
    }

    pub fn tick(&self, config: &SmoothingConfig) -> TickOutcome {
        EngineStats::bump(&self.shared.stats.ticks);
        if self.shared.is_enabled() {
            self.tick_enabled(config)
        } else {
            self.tick_disabled()
        }
    }

    fn tick_enabled(&self, config: &SmoothingConfig) -> TickOutcome {
        let (step, pixel) = self.shared.with_positions(|positions| {
            let step = positions.filter.step(config);
            (step, positions.filter.smoothed.round())
        });

        // A settled filter only goes quiet once its pixel actually landed
        if !step.moved() && self.placed.get() == Some(pixel) {
            return TickOutcome::Idle;
        }

        let actual = match self.device.cursor_position() {
            Ok(point) => point,
            Err(e) => return self.device_error(e),
        };
        if actual == pixel {
            self.placed.set(Some(pixel));
            return if step.moved() {
                TickOutcome::Unchanged
            } else {
                TickOutcome::Idle
            };
        }

        match self.device.set_cursor_position(pixel) {
            Ok(()) => {
                self.placed.set(Some(pixel));
                EngineStats::bump(&self.shared.stats.cursor_sets);
                TickOutcome::Placed(pixel)
            }
            Err(e) => self.device_error(e),
        }
    }

    fn tick_disabled(&self) -> TickOutcome {
        self.placed.set(None);
        match self.device.cursor_position() {
            Ok(point) => {
                self.shared.resync_if_disabled(point);
                TickOutcome::Resynced
            }
            Err(e) => self.device_error(e),
        }
    }

    fn device_error(&self, error: PointerError) -> TickOutcome {
        self.placed.set(None);
        let count = self.shared.stats.device_errors.fetch_add(1, Ordering::Relaxed);
        // Transient by nature; avoid flooding the log at 1 kHz
        if count % 1000 == 0 {
            tracing::warn!("Cursor device call failed during tick: {}", error);
        }
        TickOutcome::DeviceError
    }
}
