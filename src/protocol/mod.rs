//! Serial protocol for the wheel controller.
//!
//! The controller transmits one fixed-size frame per control event:
//!
//! ```text
//! byte 0: 0xFF         sync marker
//! byte 1: control id   0 steering, 1 throttle, 2 brake, 3 upshift, 4 downshift
//! byte 2-3: value      little-endian; signed for steering, unsigned for pedals
//! ```
//!
//! No acknowledgement, no checksum. [`frame`] holds the frame format and
//! payload decoding, [`decoder`] the resynchronizing scan loop over the
//! serial byte stream.

pub mod decoder;
pub mod frame;

pub use decoder::FrameDecoder;
pub use frame::{ControlId, FrameError, RawSample, PAYLOAD_LEN, SYNC_BYTE};
