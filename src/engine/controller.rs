//! Mode controller
//!
//! Owns the hook subscription and the worker thread, and exposes the control
//! surface used by whatever hosts the engine (tray icon, hotkeys, CLI):
//! `start`, `stop`, `toggle`, `is_enabled` and a status snapshot.

use crate::capture::device::{PointerDevice, PointerError, PointerResult, SubscriptionId};
use crate::capture::input::capture::InputCapture;
use crate::capture::input::types::{CursorPoint, ScreenBounds};
use crate::config::{ConfigError, LiveConfig, SmoothingConfig};
use crate::engine::state::{EngineShared, StatsSnapshot};
use crate::engine::worker::SmoothingWorker;
use crate::processing::vector::Position;
use parking_lot::Mutex as ParkingMutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Screen size assumed until the device reports one
const FALLBACK_BOUNDS: ScreenBounds = ScreenBounds {
    width: 1920,
    height: 1080,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModeState {
    Stopped,
    RunningDisabled,
    RunningEnabled,
}

/// Point-in-time view of the engine for presentation layers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStatus {
    pub state: ModeState,
    pub target: Position,
    pub smoothed: Position,
    pub bounds: ScreenBounds,
    pub config: SmoothingConfig,
    pub stats: StatsSnapshot,
}

struct ActiveSession {
    subscription: SubscriptionId,
    worker: JoinHandle<()>,
}

pub struct MouseSmoother {
    device: Arc<dyn PointerDevice>,
    shared: Arc<EngineShared>,
    config: Arc<LiveConfig>,
    session: ParkingMutex<Option<ActiveSession>>,
}

impl MouseSmoother {
    pub fn new(device: Arc<dyn PointerDevice>, config: SmoothingConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_live_config(device, LiveConfig::new(config)?))
    }

    pub fn with_defaults(device: Arc<dyn PointerDevice>) -> Self {
        Self::with_live_config(device, LiveConfig::default())
    }

    fn with_live_config(device: Arc<dyn PointerDevice>, config: LiveConfig) -> Self {
        // Seeded from the real cursor now; bounds are sampled again on start
        let bounds = device.screen_bounds().unwrap_or(FALLBACK_BOUNDS);
        let cursor = device.cursor_position().unwrap_or_default();

        Self {
            device,
            shared: Arc::new(EngineShared::new(bounds, cursor)),
            config: Arc::new(config),
            session: ParkingMutex::new(None),
        }
    }

    /// Subscribe to raw input and start the worker. No-op if already running.
    pub fn start(&self) -> PointerResult<()> {
        let mut session = self.session.lock();
        self.start_locked(&mut session)
    }

    fn start_locked(&self, session: &mut Option<ActiveSession>) -> PointerResult<()> {
        if session.is_some() {
            tracing::debug!("Smoothing already running");
            return Ok(());
        }

        // Bounds are sampled once per start
        let bounds = self.device.screen_bounds()?;
        let cursor = self.device.cursor_position()?;

        let capture = Arc::new(InputCapture::new(self.shared.clone(), self.device.clone()));
        let subscription = self.device.subscribe(capture).map_err(|e| {
            tracing::error!("Failed to subscribe to pointer input: {}", e);
            e
        })?;

        // The cursor may have moved while the hook was being installed
        let cursor = self.device.cursor_position().unwrap_or(cursor);
        self.shared.arm_shutdown();
        self.shared.set_running(true);
        self.shared.seed_and_enable(bounds, cursor);

        let worker = SmoothingWorker::new(self.shared.clone(), self.device.clone(), self.config.clone());
        let worker = match worker.spawn() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!("Failed to spawn smoothing worker: {}", e);
                self.shared.set_running(false);
                self.shared.set_enabled(false);
                if let Err(unsub) = self.device.unsubscribe(subscription) {
                    tracing::warn!("Failed to roll back subscription: {}", unsub);
                }
                return Err(PointerError::Spawn(e));
            }
        };

        *session = Some(ActiveSession {
            subscription,
            worker,
        });

        tracing::info!(
            "Smoothing started (screen={}x{}, cursor=({}, {}), {})",
            bounds.width,
            bounds.height,
            cursor.x,
            cursor.y,
            subscription
        );
        Ok(())
    }

    /// Stop the worker and drop the subscription. No-op if already stopped.
    pub fn stop(&self) {
        let mut session = self.session.lock();
        let Some(active) = session.take() else {
            return;
        };

        self.shared.set_running(false);
        self.shared.set_enabled(false);
        self.shared.request_shutdown();

        if active.worker.join().is_err() {
            tracing::error!("Smoothing worker panicked");
        }

        if let Err(e) = self.device.unsubscribe(active.subscription) {
            tracing::warn!("Failed to unsubscribe from pointer input: {}", e);
        }

        if let Ok(cursor) = self.device.cursor_position() {
            self.shared.with_positions(|positions| positions.resync(cursor));
        }

        tracing::info!("Smoothing stopped");
    }

    /// Start if stopped; otherwise flip between smoothing and pass-through.
    pub fn toggle(&self) -> PointerResult<()> {
        let mut session = self.session.lock();
        if session.is_none() {
            return self.start_locked(&mut session);
        }

        if self.shared.is_enabled() {
            self.shared.set_enabled(false);
            tracing::info!("Smoothing disabled");
            return Ok(());
        }

        // Reseed so drift from other input sources while disabled never jumps
        match self.device.cursor_position() {
            Ok(cursor) => self.shared.reseed_and_enable(cursor),
            Err(e) => {
                // Disabled ticks kept the state in sync up to the last tick
                tracing::warn!("Re-enabling without reseed, cursor unreadable: {}", e);
                self.shared.set_enabled(true);
            }
        }
        tracing::info!("Smoothing enabled");
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.is_enabled()
    }

    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    pub fn state(&self) -> ModeState {
        match (self.shared.is_running(), self.shared.is_enabled()) {
            (false, _) => ModeState::Stopped,
            (true, false) => ModeState::RunningDisabled,
            (true, true) => ModeState::RunningEnabled,
        }
    }

    pub fn status(&self) -> EngineStatus {
        let positions = self.shared.positions();
        EngineStatus {
            state: self.state(),
            target: positions.filter.target,
            smoothed: positions.filter.smoothed,
            bounds: positions.bounds,
            config: self.config.get(),
            stats: self.shared.stats.snapshot(),
        }
    }

    pub fn config(&self) -> SmoothingConfig {
        self.config.get()
    }

    /// Replace the config; the worker picks it up on its next tick
    pub fn set_config(&self, config: SmoothingConfig) -> Result<(), ConfigError> {
        self.config.set(config)
    }

    /// Cursor position the engine is currently aiming at, rounded to a pixel
    pub fn target_pixel(&self) -> CursorPoint {
        self.shared.positions().filter.target.round()
    }
}

impl Drop for MouseSmoother {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::input::types::HookDecision;
    use crate::capture::virtual_device::VirtualPointer;
    use std::time::{Duration, Instant};

    fn setup() -> (Arc<VirtualPointer>, MouseSmoother) {
        let device = Arc::new(VirtualPointer::new(
            ScreenBounds::new(1920, 1080),
            CursorPoint::new(500, 500),
        ));
        let smoother = MouseSmoother::with_defaults(device.clone());
        (device, smoother)
    }

    fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !condition() {
            assert!(Instant::now() < deadline, "timed out waiting for {}", what);
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_start_is_idempotent() {
        let (device, smoother) = setup();
        assert_eq!(smoother.state(), ModeState::Stopped);

        smoother.start().unwrap();
        smoother.start().unwrap();

        assert_eq!(smoother.state(), ModeState::RunningEnabled);
        assert!(smoother.is_enabled());
        assert_eq!(device.subscribe_calls(), 1);
        assert_eq!(device.subscriber_count(), 1);
        wait_until("worker thread start", || device.elevate_calls() > 0);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(device.elevate_calls(), 1, "a second worker thread was spawned");
    }

    #[test]
    fn test_subscribe_failure_leaves_engine_stopped() {
        let (device, smoother) = setup();
        device.fail_subscribe(true);

        let result = smoother.start();
        assert!(matches!(result, Err(PointerError::HookInstall(_))));
        assert_eq!(smoother.state(), ModeState::Stopped);
        assert!(!smoother.is_enabled());
        assert_eq!(device.subscriber_count(), 0);
        assert_eq!(device.elevate_calls(), 0);

        // Physical input is untouched
        assert_eq!(device.move_physical(5, 5), HookDecision::PassThrough);

        device.fail_subscribe(false);
        smoother.start().unwrap();
        assert_eq!(smoother.state(), ModeState::RunningEnabled);
    }

    #[test]
    fn test_subscribe_failure_keeps_previous_state() {
        let device = Arc::new(VirtualPointer::new(
            ScreenBounds::new(800, 600),
            CursorPoint::new(100, 100),
        ));
        let smoother = MouseSmoother::with_defaults(device.clone());
        let before = smoother.status();

        device.warp(CursorPoint::new(700, 50));
        device.fail_subscribe(true);
        assert!(smoother.start().is_err());

        let after = smoother.status();
        assert_eq!(after.state, ModeState::Stopped);
        assert_eq!(after.bounds, before.bounds);
        assert_eq!(after.target, before.target);
        assert_eq!(after.smoothed, before.smoothed);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (device, smoother) = setup();
        smoother.stop();
        assert_eq!(smoother.state(), ModeState::Stopped);

        smoother.start().unwrap();
        smoother.stop();
        smoother.stop();

        assert_eq!(smoother.state(), ModeState::Stopped);
        assert_eq!(device.subscriber_count(), 0);
        assert_eq!(device.move_physical(10, 0), HookDecision::PassThrough);
        assert_eq!(device.current(), CursorPoint::new(510, 500));
    }

    #[test]
    fn test_physical_motion_is_smoothed_onto_cursor() {
        let (device, smoother) = setup();
        smoother.start().unwrap();

        assert_eq!(device.move_physical(50, -30), HookDecision::Suppress);
        assert_eq!(smoother.target_pixel(), CursorPoint::new(550, 470));

        wait_until("cursor to reach target", || {
            device.current() == CursorPoint::new(550, 470)
        });
        let status = smoother.status();
        assert_eq!(status.target, Position::new(550.0, 470.0));
        assert!(status.stats.cursor_sets > 0);
    }

    #[test]
    fn test_toggle_cycles_modes() {
        let (_device, smoother) = setup();

        smoother.toggle().unwrap();
        assert_eq!(smoother.state(), ModeState::RunningEnabled);

        smoother.toggle().unwrap();
        assert_eq!(smoother.state(), ModeState::RunningDisabled);
        assert!(!smoother.is_enabled());

        smoother.toggle().unwrap();
        assert_eq!(smoother.state(), ModeState::RunningEnabled);
    }

    #[test]
    fn test_disabled_mode_passes_input_through() {
        let (device, smoother) = setup();
        smoother.start().unwrap();
        smoother.toggle().unwrap();

        assert_eq!(device.move_physical(25, 25), HookDecision::PassThrough);
        assert_eq!(device.current(), CursorPoint::new(525, 525));
        wait_until("state to follow the real cursor", || {
            let status = smoother.status();
            status.target == Position::new(525.0, 525.0) && status.smoothed == status.target
        });
    }

    #[test]
    fn test_reenable_does_not_jump() {
        let (device, smoother) = setup();
        smoother.start().unwrap();
        smoother.toggle().unwrap();

        // Another input source moves the cursor while smoothing is off
        device.warp(CursorPoint::new(100, 900));
        smoother.toggle().unwrap();

        let status = smoother.status();
        assert_eq!(status.state, ModeState::RunningEnabled);
        assert_eq!(status.smoothed, Position::new(100.0, 900.0));
        assert_eq!(status.target, Position::new(100.0, 900.0));

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(device.current(), CursorPoint::new(100, 900));
    }

    #[test]
    fn test_live_config_change() {
        let (device, smoother) = setup();
        let instant = SmoothingConfig {
            smoothing_factor: 1.0,
            ..Default::default()
        };
        smoother.set_config(instant).unwrap();
        assert_eq!(smoother.config().smoothing_factor, 1.0);

        let rejected = SmoothingConfig {
            smoothing_factor: 0.0,
            ..Default::default()
        };
        assert!(smoother.set_config(rejected).is_err());
        assert_eq!(smoother.config().smoothing_factor, 1.0);

        smoother.start().unwrap();
        device.move_physical(-200, 0);
        wait_until("cursor to jump to target", || {
            device.current() == CursorPoint::new(300, 500)
        });
        assert_eq!(smoother.status().config, instant);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let device = Arc::new(VirtualPointer::new(
            ScreenBounds::new(800, 600),
            CursorPoint::new(0, 0),
        ));
        let config = SmoothingConfig {
            tick_interval_us: 0,
            ..Default::default()
        };
        assert!(MouseSmoother::new(device, config).is_err());
    }

    #[test]
    fn test_drop_stops_engine() {
        let (device, smoother) = setup();
        smoother.start().unwrap();
        assert_eq!(device.subscriber_count(), 1);

        drop(smoother);
        assert_eq!(device.subscriber_count(), 0);
        assert_eq!(device.move_physical(1, 1), HookDecision::PassThrough);
    }

    #[test]
    fn test_status_serializes() {
        let (_device, smoother) = setup();
        let json = serde_json::to_value(smoother.status()).unwrap();
        assert_eq!(json["state"], "stopped");
        assert_eq!(json["bounds"]["width"], 1920);
        assert_eq!(json["config"]["smoothingFactor"], 0.45);
        assert_eq!(json["target"]["x"], 500.0);
    }
}
