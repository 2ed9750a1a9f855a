//! Smoothing configuration
//!
//! All tunables the worker reads on every tick. Values can be loaded from a
//! JSON file at startup and replaced at runtime through [`LiveConfig`].

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default one-pole filter coefficient
pub const DEFAULT_SMOOTHING_FACTOR: f64 = 0.45;

/// Default worker tick interval in microseconds (1 ms)
pub const DEFAULT_TICK_INTERVAL_US: u64 = 1_000;

/// Default distance below which interpolation stops
pub const DEFAULT_DEADBAND: f64 = 0.1;

/// Default distance below which residual error is discarded
pub const DEFAULT_SNAP_THRESHOLD: f64 = 0.001;

/// Errors that can occur while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SmoothingConfig {
    /// Fraction of the remaining distance covered per tick, in (0, 1]
    pub smoothing_factor: f64,
    /// Worker tick interval in microseconds
    pub tick_interval_us: u64,
    /// Distance above which the filter interpolates
    pub deadband: f64,
    /// Distance above which a sub-deadband residue is snapped to target
    pub snap_threshold: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            smoothing_factor: DEFAULT_SMOOTHING_FACTOR,
            tick_interval_us: DEFAULT_TICK_INTERVAL_US,
            deadband: DEFAULT_DEADBAND,
            snap_threshold: DEFAULT_SNAP_THRESHOLD,
        }
    }
}

impl SmoothingConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_micros(self.tick_interval_us)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let factor = self.smoothing_factor;
        if !(factor.is_finite() && factor > 0.0 && factor <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "smoothingFactor must be in (0, 1], got {}",
                factor
            )));
        }
        if self.tick_interval_us == 0 {
            return Err(ConfigError::Invalid(
                "tickIntervalUs must be positive".to_string(),
            ));
        }
        if !(self.snap_threshold.is_finite() && self.snap_threshold >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "snapThreshold must be a non-negative number, got {}",
                self.snap_threshold
            )));
        }
        if !(self.deadband.is_finite() && self.deadband >= self.snap_threshold) {
            return Err(ConfigError::Invalid(format!(
                "deadband must be at least snapThreshold ({}), got {}",
                self.snap_threshold, self.deadband
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SmoothingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;
        tracing::info!("Loaded smoothing config from {}", path.display());
        Ok(config)
    }
}

/// Config shared between the controller and the worker
#[derive(Debug, Default)]
pub struct LiveConfig {
    inner: RwLock<SmoothingConfig>,
}

impl LiveConfig {
    pub fn new(config: SmoothingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            inner: RwLock::new(config),
        })
    }

    pub fn get(&self) -> SmoothingConfig {
        *self.inner.read()
    }

    /// Replace the config. Rejected values leave the current config in place.
    pub fn set(&self, config: SmoothingConfig) -> Result<(), ConfigError> {
        config.validate()?;
        *self.inner.write() = config;
        tracing::debug!(?config, "Smoothing config updated");
        Ok(())
    }
}
