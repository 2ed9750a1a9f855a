//! Raw movement handler
//!
//! Runs on the OS hook-dispatch context. Physical motion is turned into a
//! delta against the real cursor and folded into the target; the event is
//! then suppressed so only the smoothing worker places the cursor.

use crate::capture::device::{MoveHandler, PointerDevice};
use crate::capture::input::types::{HookDecision, MoveEvent};
use crate::engine::state::{EngineShared, EngineStats};
use crate::processing::vector::Position;
use std::sync::Arc;

pub struct InputCapture {
    shared: Arc<EngineShared>,
    device: Arc<dyn PointerDevice>,
}

impl InputCapture {
    pub fn new(shared: Arc<EngineShared>, device: Arc<dyn PointerDevice>) -> Self {
        Self { shared, device }
    }
}

impl MoveHandler for InputCapture {
    fn on_move(&self, event: &MoveEvent) -> HookDecision {
        if !self.shared.is_enabled() {
            return HookDecision::PassThrough;
        }

        // Our own cursor placement comes back through the hook
        if event.injected {
            EngineStats::bump(&self.shared.stats.events_injected);
            return HookDecision::PassThrough;
        }

        let actual = match self.device.cursor_position() {
            Ok(point) => point,
            Err(e) => {
                EngineStats::bump(&self.shared.stats.device_errors);
                tracing::trace!("Passing move through, cursor unreadable: {}", e);
                return HookDecision::PassThrough;
            }
        };

        let delta = Position::from(event.position) - Position::from(actual);
        if !delta.is_zero() {
            self.shared.with_positions(|positions| positions.accumulate(delta));
            EngineStats::bump(&self.shared.stats.events_applied);
        }

        HookDecision::Suppress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::input::types::{CursorPoint, ScreenBounds};
    use crate::capture::virtual_device::VirtualPointer;

    fn setup() -> (Arc<EngineShared>, Arc<VirtualPointer>, InputCapture) {
        let bounds = ScreenBounds::new(1920, 1080);
        let cursor = CursorPoint::new(500, 500);
        let shared = Arc::new(EngineShared::new(bounds, cursor));
        let device = Arc::new(VirtualPointer::new(bounds, cursor));
        let capture = InputCapture::new(shared.clone(), device.clone());
        (shared, device, capture)
    }

    #[test]
    fn test_disabled_passes_through_untouched() {
        let (shared, _device, capture) = setup();

        let decision = capture.on_move(&MoveEvent::physical(CursorPoint::new(600, 500)));
        assert_eq!(decision, HookDecision::PassThrough);
        assert_eq!(shared.positions().filter.target, Position::new(500.0, 500.0));
    }

    #[test]
    fn test_injected_event_ignored() {
        let (shared, _device, capture) = setup();
        shared.set_enabled(true);

        let decision = capture.on_move(&MoveEvent::injected(CursorPoint::new(900, 900)));
        assert_eq!(decision, HookDecision::PassThrough);
        assert_eq!(shared.positions().filter.target, Position::new(500.0, 500.0));
        assert_eq!(shared.stats.snapshot().events_injected, 1);
    }

    #[test]
    fn test_delta_is_relative_to_actual_cursor() {
        let (shared, device, capture) = setup();
        shared.set_enabled(true);
        device.warp(CursorPoint::new(510, 490));

        let decision = capture.on_move(&MoveEvent::physical(CursorPoint::new(515, 480)));
        assert_eq!(decision, HookDecision::Suppress);
        assert_eq!(shared.positions().filter.target, Position::new(505.0, 490.0));
        // Smoothed position is the worker's business
        assert_eq!(shared.positions().filter.smoothed, Position::new(500.0, 500.0));
    }

    #[test]
    fn test_zero_delta_changes_nothing() {
        let (shared, _device, capture) = setup();
        shared.set_enabled(true);

        let decision = capture.on_move(&MoveEvent::physical(CursorPoint::new(500, 500)));
        assert_eq!(decision, HookDecision::Suppress);
        assert_eq!(shared.positions().filter.target, Position::new(500.0, 500.0));
        assert_eq!(shared.stats.snapshot().events_applied, 0);
    }

    #[test]
    fn test_target_sequence_and_clamp() {
        let (shared, _device, capture) = setup();
        shared.set_enabled(true);

        let mut xs = Vec::new();
        for _ in 0..5 {
            // Cursor never moves because every event is suppressed
            capture.on_move(&MoveEvent::physical(CursorPoint::new(550, 500)));
            xs.push(shared.positions().filter.target.x);
        }
        assert_eq!(xs, vec![550.0, 600.0, 650.0, 700.0, 750.0]);

        for _ in 0..100 {
            capture.on_move(&MoveEvent::physical(CursorPoint::new(400, 1000)));
            let target = shared.positions().filter.target;
            assert!((0.0..=1919.0).contains(&target.x));
            assert!((0.0..=1079.0).contains(&target.y));
        }
        assert_eq!(shared.positions().filter.target, Position::new(0.0, 1079.0));
    }

    #[test]
    fn test_unreadable_cursor_degrades_to_pass_through() {
        let (shared, device, capture) = setup();
        shared.set_enabled(true);
        device.fail_reads(true);

        let decision = capture.on_move(&MoveEvent::physical(CursorPoint::new(600, 600)));
        assert_eq!(decision, HookDecision::PassThrough);
        assert_eq!(shared.positions().filter.target, Position::new(500.0, 500.0));
        assert_eq!(shared.stats.snapshot().device_errors, 1);
    }
}
