//! Per-control dispatch from decoded samples to gamepad mutations.
//!
//! Exactly one gamepad action per sample, applied synchronously:
//!
//! ```text
//! RawSample ──► calibration ──► GamepadSink write ──► flush
//! ```
//!
//! The trailing flush after every event means the device reflects the new
//! state before the next frame is decoded; there is no batching. Paddle
//! presses run as press → flush → hold → release → flush inside the same
//! dispatch, so two pulses can never overlap even if the controller spams
//! shift frames faster than the hold window.

use std::time::Duration;

use tracing::debug;

use crate::gamepad::{GamepadButton, GamepadError, GamepadSink};
use crate::protocol::{ControlId, RawSample};

use super::range::{BRAKE_RANGE, STEERING_GAIN, STEERING_RANGE, THROTTLE_RANGE};

/// How long a shift paddle press is held on the virtual pad. Long enough
/// for any host-side poll rate to observe the press as a discrete edge.
pub const BUTTON_HOLD: Duration = Duration::from_millis(10);

/// Applies calibration and writes each sample to the gamepad sink.
///
/// Holds no state between events beyond the sink handle and the fixed
/// calibration table; the sink owns the actual gamepad state.
pub struct InputMapper<S> {
    sink: S,
    button_hold: Duration,
}

impl<S: GamepadSink> InputMapper<S> {
    pub fn new(sink: S) -> Self {
        Self::with_button_hold(sink, BUTTON_HOLD)
    }

    /// Like [`new`](Self::new) with an explicit paddle hold duration.
    /// Tests pass `Duration::ZERO` to keep the pulse sequence observable
    /// without real sleeps.
    pub fn with_button_hold(sink: S, button_hold: Duration) -> Self {
        Self { sink, button_hold }
    }

    /// Applies one decoded sample to the gamepad.
    ///
    /// # Errors
    ///
    /// Propagates sink write failures; the connection worker treats those
    /// as fatal and tears the bridge down.
    pub fn apply(&mut self, sample: RawSample) -> Result<(), GamepadError> {
        let raw = sample.value as f32;

        match sample.control {
            ControlId::Steering => {
                let x = STEERING_RANGE.map(raw) * STEERING_GAIN;
                debug!("Steering {} -> stick x {:.3}", sample.value, x);
                self.sink.set_left_stick(x, 0.0)?;
            }
            ControlId::Throttle => {
                let v = THROTTLE_RANGE.map(raw);
                debug!("Throttle {} -> right trigger {:.3}", sample.value, v);
                self.sink.set_right_trigger(v)?;
            }
            ControlId::Brake => {
                let v = BRAKE_RANGE.map(raw);
                debug!("Brake {} -> left trigger {:.3}", sample.value, v);
                self.sink.set_left_trigger(v)?;
            }
            ControlId::Upshift => {
                debug!("Upshift pulse");
                self.pulse(GamepadButton::RightShoulder)?;
            }
            ControlId::Downshift => {
                debug!("Downshift pulse");
                self.pulse(GamepadButton::LeftShoulder)?;
            }
        }

        // Commit before the next sample is processed
        self.sink.flush()
    }

    /// Press, commit, hold, release. The press is flushed before the hold
    /// delay and the release after it (via the per-event flush in
    /// [`apply`](Self::apply)), so the host observes a discrete press even
    /// when polling faster than the hold window.
    fn pulse(&mut self, button: GamepadButton) -> Result<(), GamepadError> {
        self.sink.press_button(button)?;
        self.sink.flush()?;
        std::thread::sleep(self.button_hold);
        self.sink.release_button(button)?;
        self.sink.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum SinkAction {
        LeftStick(f32, f32),
        RightTrigger(f32),
        LeftTrigger(f32),
        Press(GamepadButton),
        Release(GamepadButton),
        Flush,
    }

    /// Records every sink call in order.
    #[derive(Default)]
    struct RecordingSink {
        actions: Vec<SinkAction>,
    }

    impl GamepadSink for RecordingSink {
        fn set_left_stick(&mut self, x: f32, y: f32) -> Result<(), GamepadError> {
            self.actions.push(SinkAction::LeftStick(x, y));
            Ok(())
        }

        fn set_right_trigger(&mut self, value: f32) -> Result<(), GamepadError> {
            self.actions.push(SinkAction::RightTrigger(value));
            Ok(())
        }

        fn set_left_trigger(&mut self, value: f32) -> Result<(), GamepadError> {
            self.actions.push(SinkAction::LeftTrigger(value));
            Ok(())
        }

        fn press_button(&mut self, button: GamepadButton) -> Result<(), GamepadError> {
            self.actions.push(SinkAction::Press(button));
            Ok(())
        }

        fn release_button(&mut self, button: GamepadButton) -> Result<(), GamepadError> {
            self.actions.push(SinkAction::Release(button));
            Ok(())
        }

        fn flush(&mut self) -> Result<(), GamepadError> {
            self.actions.push(SinkAction::Flush);
            Ok(())
        }
    }

    fn mapper() -> InputMapper<RecordingSink> {
        InputMapper::with_button_hold(RecordingSink::default(), Duration::ZERO)
    }

    fn apply(mapper: &mut InputMapper<RecordingSink>, control: ControlId, value: i32) {
        mapper.apply(RawSample { control, value }).unwrap();
    }

    #[test]
    fn test_steering_center_maps_to_zero() {
        let mut m = mapper();
        apply(&mut m, ControlId::Steering, 0);
        assert_eq!(
            m.sink.actions,
            vec![SinkAction::LeftStick(0.0, 0.0), SinkAction::Flush]
        );
    }

    #[test]
    fn test_steering_full_lock_applies_negated_gain() {
        let mut m = mapper();
        apply(&mut m, ControlId::Steering, 600);
        // Full interpolation gives 1.0, the -2.0 gain flips and doubles it;
        // clamping to the axis range happens in the device, not here.
        match m.sink.actions[0] {
            SinkAction::LeftStick(x, y) => {
                assert!((x - -2.0).abs() < 1e-5);
                assert_eq!(y, 0.0);
            }
            ref other => panic!("expected stick write, got {:?}", other),
        }
    }

    #[test]
    fn test_throttle_endpoints() {
        let mut m = mapper();
        apply(&mut m, ControlId::Throttle, 7);
        apply(&mut m, ControlId::Throttle, 4095);
        assert_eq!(
            m.sink.actions,
            vec![
                SinkAction::RightTrigger(0.0),
                SinkAction::Flush,
                SinkAction::RightTrigger(1.0),
                SinkAction::Flush,
            ]
        );
    }

    #[test]
    fn test_brake_goes_to_left_trigger() {
        let mut m = mapper();
        apply(&mut m, ControlId::Brake, 4095);
        assert_eq!(
            m.sink.actions,
            vec![SinkAction::LeftTrigger(1.0), SinkAction::Flush]
        );
    }

    #[test]
    fn test_upshift_pulse_sequence() {
        let mut m = mapper();
        apply(&mut m, ControlId::Upshift, 1);
        // Press committed before the hold, release after, plus the
        // per-event flush: three flushes total.
        assert_eq!(
            m.sink.actions,
            vec![
                SinkAction::Press(GamepadButton::RightShoulder),
                SinkAction::Flush,
                SinkAction::Release(GamepadButton::RightShoulder),
                SinkAction::Flush,
                SinkAction::Flush,
            ]
        );
    }

    #[test]
    fn test_downshift_uses_left_shoulder() {
        let mut m = mapper();
        apply(&mut m, ControlId::Downshift, 1);
        assert_eq!(
            m.sink.actions[0],
            SinkAction::Press(GamepadButton::LeftShoulder)
        );
        assert_eq!(
            m.sink.actions[2],
            SinkAction::Release(GamepadButton::LeftShoulder)
        );
    }

    #[test]
    fn test_pedal_values_clamp_to_calibration() {
        let mut m = mapper();
        apply(&mut m, ControlId::Throttle, 0); // below raw_min
        apply(&mut m, ControlId::Throttle, 50_000); // above raw_max
        assert_eq!(
            m.sink.actions,
            vec![
                SinkAction::RightTrigger(0.0),
                SinkAction::Flush,
                SinkAction::RightTrigger(1.0),
                SinkAction::Flush,
            ]
        );
    }
}
