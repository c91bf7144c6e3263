//! Virtual gamepad sink.
//!
//! The mapper drives the host-visible gamepad through the [`GamepadSink`]
//! capability set rather than a concrete device, so tests can record the
//! emitted actions and the uinput implementation stays swappable.
//!
//! State written through the sink is buffered until [`GamepadSink::flush`],
//! which commits it to the device in one synchronized report.

pub mod virtual_device;

pub use virtual_device::VirtualWheelPad;

use thiserror::Error;

/// Discrete buttons the bridge can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamepadButton {
    /// Left bumper, mapped from the downshift paddle
    LeftShoulder,
    /// Right bumper, mapped from the upshift paddle
    RightShoulder,
}

// Sink errors
#[derive(Debug, Error)]
pub enum GamepadError {
    /// Virtual device could not be created (uinput missing or no permission)
    #[error("Failed to create virtual gamepad: {0}")]
    DeviceCreation(String),

    /// Writing an event report to the device failed
    #[error("Failed to update virtual gamepad: {0}")]
    DeviceWrite(#[from] std::io::Error),
}

/// Capability set the input mapper needs from a gamepad device.
///
/// Axis and trigger values are normalized floats: sticks take `-1.0..=1.0`
/// per axis, triggers `0.0..=1.0`. Implementations clamp out-of-range
/// values to the device limits rather than rejecting them, since the
/// steering gain can intentionally overshoot the unit range.
pub trait GamepadSink {
    fn set_left_stick(&mut self, x: f32, y: f32) -> Result<(), GamepadError>;

    fn set_right_trigger(&mut self, value: f32) -> Result<(), GamepadError>;

    fn set_left_trigger(&mut self, value: f32) -> Result<(), GamepadError>;

    fn press_button(&mut self, button: GamepadButton) -> Result<(), GamepadError>;

    fn release_button(&mut self, button: GamepadButton) -> Result<(), GamepadError>;

    /// Commits all buffered writes to the device.
    fn flush(&mut self) -> Result<(), GamepadError>;
}
