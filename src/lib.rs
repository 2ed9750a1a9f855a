//! Mouse Smoother - real-time pointer smoothing.
//!
//! This is the main library crate. It captures raw pointer motion through a
//! system-wide hook, low-pass filters it on a dedicated worker thread, and
//! places the OS cursor on the smoothed result.

pub mod capture;
pub mod config;
pub mod engine;
pub mod processing;

pub use capture::{default_device, PointerDevice, PointerError, VirtualPointer};
pub use config::{ConfigError, SmoothingConfig};
pub use engine::{EngineStatus, ModeState, MouseSmoother};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mouse_smoother=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
