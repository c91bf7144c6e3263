//! Calibration ranges and the linear raw-to-normalized mapping.

/// Linear calibration from a raw sensor span to a normalized output span.
///
/// Raw values outside the input span clamp to the nearest bound, so a
/// sensor drifting past its calibrated limits pins the output instead of
/// overshooting it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappingRange {
    pub raw_min: f32,
    pub raw_max: f32,
    pub out_min: f32,
    pub out_max: f32,
}

/// Steering encoder span, centered on zero.
pub const STEERING_RANGE: MappingRange = MappingRange {
    raw_min: -600.0,
    raw_max: 600.0,
    out_min: -1.0,
    out_max: 1.0,
};

/// Gain applied after normalization: the encoder turns opposite to the
/// axis convention, and half a physical turn should already reach full
/// lock, hence the 2x. The device clamps the overshoot to its axis range.
pub const STEERING_GAIN: f32 = -2.0;

/// Throttle pedal ADC span. The pot never quite reaches zero at rest,
/// so the low end sits at 7 counts.
pub const THROTTLE_RANGE: MappingRange = MappingRange {
    raw_min: 7.0,
    raw_max: 4095.0,
    out_min: 0.0,
    out_max: 1.0,
};

/// Brake pedal ADC span. Currently identical to the throttle numbers; the
/// brake pot has not had its own calibration pass yet.
pub const BRAKE_RANGE: MappingRange = MappingRange {
    raw_min: 7.0,
    raw_max: 4095.0,
    out_min: 0.0,
    out_max: 1.0,
};

impl MappingRange {
    /// Maps a raw value into the output span.
    ///
    /// Clamps into `[raw_min, raw_max]`, then interpolates linearly so that
    /// `map(raw_min) == out_min` and `map(raw_max) == out_max`. A
    /// degenerate span (`raw_min == raw_max`) yields `out_min`.
    pub fn map(&self, raw: f32) -> f32 {
        if self.raw_min == self.raw_max {
            return self.out_min;
        }

        let clamped = raw.clamp(self.raw_min, self.raw_max);
        let t = (clamped - self.raw_min) / (self.raw_max - self.raw_min);
        self.out_min + t * (self.out_max - self.out_min)
    }
}
