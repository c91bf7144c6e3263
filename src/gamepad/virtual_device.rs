//! Linux uinput implementation of the gamepad sink.
//!
//! Creates a virtual device with the evdev layout of an Xbox-style pad
//! (ABS_X/ABS_Y left stick, ABS_Z/ABS_RZ triggers, BTN_TL/BTN_TR bumpers)
//! so the host sees an ordinary gamepad. Events queue in memory and go out
//! as one report per [`flush`](GamepadSink::flush); `emit` appends the
//! SYN_REPORT that makes the report visible to readers.

use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AbsInfo, AbsoluteAxisType, AttributeSet, EventType, InputEvent, Key, UinputAbsSetup,
};
use tracing::{debug, info};

use super::{GamepadButton, GamepadError, GamepadSink};

// Stick axis range used by the kernel xpad driver
const STICK_MIN: i32 = -32768;
const STICK_MAX: i32 = 32767;
const STICK_FUZZ: i32 = 16;
const STICK_FLAT: i32 = 128;

// Triggers are 8-bit on xpad-style devices
const TRIGGER_MAX: i32 = 255;

/// Virtual wheel-and-pedals gamepad backed by `/dev/uinput`.
pub struct VirtualWheelPad {
    device: VirtualDevice,
    pending: Vec<InputEvent>,
}

impl VirtualWheelPad {
    /// Registers the virtual device with the kernel.
    ///
    /// # Errors
    ///
    /// Returns [`GamepadError::DeviceCreation`] if `/dev/uinput` is absent
    /// or not writable by the current user.
    pub fn new(name: &str) -> Result<Self, GamepadError> {
        let mut keys = AttributeSet::<Key>::new();
        keys.insert(Key::BTN_TL);
        keys.insert(Key::BTN_TR);

        let stick_info = AbsInfo::new(0, STICK_MIN, STICK_MAX, STICK_FUZZ, STICK_FLAT, 0);
        let trigger_info = AbsInfo::new(0, 0, TRIGGER_MAX, 0, 0, 0);

        let device = VirtualDeviceBuilder::new()
            .map_err(|e| GamepadError::DeviceCreation(e.to_string()))?
            .name(name)
            .with_keys(&keys)
            .map_err(|e| GamepadError::DeviceCreation(e.to_string()))?
            .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisType::ABS_X, stick_info))
            .map_err(|e| GamepadError::DeviceCreation(e.to_string()))?
            .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisType::ABS_Y, stick_info))
            .map_err(|e| GamepadError::DeviceCreation(e.to_string()))?
            .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisType::ABS_Z, trigger_info))
            .map_err(|e| GamepadError::DeviceCreation(e.to_string()))?
            .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisType::ABS_RZ, trigger_info))
            .map_err(|e| GamepadError::DeviceCreation(e.to_string()))?
            .build()
            .map_err(|e| GamepadError::DeviceCreation(e.to_string()))?;

        info!("Created virtual gamepad '{}'", name);

        Ok(Self {
            device,
            pending: Vec::new(),
        })
    }

    fn queue_axis(&mut self, axis: AbsoluteAxisType, value: i32) {
        self.pending
            .push(InputEvent::new(EventType::ABSOLUTE, axis.0, value));
    }

    fn queue_key(&mut self, button: GamepadButton, pressed: bool) {
        let key = match button {
            GamepadButton::LeftShoulder => Key::BTN_TL,
            GamepadButton::RightShoulder => Key::BTN_TR,
        };
        self.pending.push(InputEvent::new(
            EventType::KEY,
            key.code(),
            i32::from(pressed),
        ));
    }
}

// Normalized float to integer axis value, clamped to the device range.
// The steering path can legitimately exceed the unit range because of its
// gain factor; the clamp here is the documented device-level limit.
fn scale_stick(value: f32) -> i32 {
    (value.clamp(-1.0, 1.0) * STICK_MAX as f32) as i32
}

fn scale_trigger(value: f32) -> i32 {
    (value.clamp(0.0, 1.0) * TRIGGER_MAX as f32) as i32
}

impl GamepadSink for VirtualWheelPad {
    fn set_left_stick(&mut self, x: f32, y: f32) -> Result<(), GamepadError> {
        self.queue_axis(AbsoluteAxisType::ABS_X, scale_stick(x));
        self.queue_axis(AbsoluteAxisType::ABS_Y, scale_stick(y));
        Ok(())
    }

    fn set_right_trigger(&mut self, value: f32) -> Result<(), GamepadError> {
        self.queue_axis(AbsoluteAxisType::ABS_RZ, scale_trigger(value));
        Ok(())
    }

    fn set_left_trigger(&mut self, value: f32) -> Result<(), GamepadError> {
        self.queue_axis(AbsoluteAxisType::ABS_Z, scale_trigger(value));
        Ok(())
    }

    fn press_button(&mut self, button: GamepadButton) -> Result<(), GamepadError> {
        self.queue_key(button, true);
        Ok(())
    }

    fn release_button(&mut self, button: GamepadButton) -> Result<(), GamepadError> {
        self.queue_key(button, false);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), GamepadError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        debug!("Flushing {} gamepad events", self.pending.len());
        self.device.emit(&self.pending)?;
        self.pending.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stick_scaling_clamps_to_device_range() {
        assert_eq!(scale_stick(0.0), 0);
        assert_eq!(scale_stick(1.0), STICK_MAX);
        // Steering gain overshoot clamps at the rail
        assert_eq!(scale_stick(-2.0), -STICK_MAX);
        assert_eq!(scale_stick(2.0), STICK_MAX);
    }

    #[test]
    fn test_trigger_scaling() {
        assert_eq!(scale_trigger(0.0), 0);
        assert_eq!(scale_trigger(1.0), TRIGGER_MAX);
        assert_eq!(scale_trigger(0.5), 127);
        assert_eq!(scale_trigger(-0.3), 0);
        assert_eq!(scale_trigger(1.7), TRIGGER_MAX);
    }
}
