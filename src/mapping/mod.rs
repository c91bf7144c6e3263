//! Raw-to-normalized input mapping.
//!
//! Converts decoded [`RawSample`](crate::protocol::RawSample)s into gamepad
//! mutations: clamped linear calibration for the analog controls in
//! [`range`], per-control dispatch and paddle pulse handling in [`mapper`].

pub mod mapper;
pub mod range;

pub use mapper::{InputMapper, BUTTON_HOLD};
pub use range::{MappingRange, BRAKE_RANGE, STEERING_GAIN, STEERING_RANGE, THROTTLE_RANGE};
