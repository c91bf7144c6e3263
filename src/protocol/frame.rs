use thiserror::Error;

/// Marker byte that starts every frame on the wire.
pub const SYNC_BYTE: u8 = 0xFF;

/// Payload length following the sync byte: control id + 16-bit value.
pub const PAYLOAD_LEN: usize = 3;

// Identity of a physical control on the wheel assembly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlId {
    /// Steering wheel rotary encoder, signed counts around center
    Steering,
    /// Throttle pedal potentiometer, unsigned ADC counts
    Throttle,
    /// Brake pedal potentiometer, unsigned ADC counts
    Brake,
    /// Upshift paddle, presence pulse only
    Upshift,
    /// Downshift paddle, presence pulse only
    Downshift,
}

impl ControlId {
    /// Maps a wire identifier to a control. The set is closed; anything
    /// outside 0..=4 is rejected by the decoder.
    pub fn from_raw(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::Steering),
            1 => Some(Self::Throttle),
            2 => Some(Self::Brake),
            3 => Some(Self::Upshift),
            4 => Some(Self::Downshift),
            _ => None,
        }
    }

    pub fn raw(self) -> u8 {
        match self {
            Self::Steering => 0,
            Self::Throttle => 1,
            Self::Brake => 2,
            Self::Upshift => 3,
            Self::Downshift => 4,
        }
    }
}

/// One decoded control event.
///
/// `value` interpretation depends on the control: signed encoder counts for
/// [`ControlId::Steering`], unsigned ADC counts for the pedals, and a
/// constant `1` for the shift paddles (the paddles report presence, not
/// magnitude). Samples are consumed within one worker iteration and never
/// buffered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    pub control: ControlId,
    pub value: i32,
}

// Frame-level errors, recovered locally by the decoder
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("Unrecognized control id: {0}")]
    UnknownControl(u8),
}

/// Decodes one 3-byte payload (`[control_id, value_lo, value_hi]`).
///
/// Value bytes are little-endian; signedness follows the control identity.
pub fn decode_payload(payload: &[u8; PAYLOAD_LEN]) -> Result<RawSample, FrameError> {
    let control =
        ControlId::from_raw(payload[0]).ok_or(FrameError::UnknownControl(payload[0]))?;

    let value = match control {
        ControlId::Steering => i16::from_le_bytes([payload[1], payload[2]]) as i32,
        ControlId::Throttle | ControlId::Brake => {
            u16::from_le_bytes([payload[1], payload[2]]) as i32
        }
        // Paddles carry no magnitude, the frame only signals the press
        ControlId::Upshift | ControlId::Downshift => 1,
    };

    Ok(RawSample { control, value })
}
