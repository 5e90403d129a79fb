//! Conversion between physical units and ramp generator register values.
//!
//! The ramp generator works in microsteps and in time units derived from the
//! chip clock:
//!
//! - velocity: `v[usteps/t] = v[usteps/s] * 2^24 / fclk`
//! - acceleration: `a[usteps/t²] = a[usteps/s²] * 2^41 / fclk²`
//!
//! All physical values here are in full steps, scaled by the configured
//! microstep ratio. Callers must keep inputs within the register width; out of
//! range values saturate.

use libm::roundf;

use crate::config::units::Microsteps;

/// Clock frequency of the internal oscillator in Hz.
pub const DEFAULT_CLOCK_HZ: u32 = 13_200_000;

/// 2^24, the velocity time base denominator.
const TWO_POW_24: f32 = 16_777_216.0;

/// 512 * 256, the acceleration time base prescaler.
const ACCEL_PRESCALER: f32 = 131_072.0;

/// Converts between physical units and register encodings.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnitConverter {
    clock_hz: u32,
    microsteps: Microsteps,
}

impl Default for UnitConverter {
    fn default() -> Self {
        Self::new(DEFAULT_CLOCK_HZ, Microsteps::default())
    }
}

impl UnitConverter {
    /// Create a converter for a given clock and microstep ratio.
    #[inline]
    pub const fn new(clock_hz: u32, microsteps: Microsteps) -> Self {
        Self {
            clock_hz,
            microsteps,
        }
    }

    /// Chip clock frequency in Hz.
    #[inline]
    pub const fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    /// Microsteps per full step.
    #[inline]
    pub const fn microsteps(&self) -> Microsteps {
        self.microsteps
    }

    /// Steps per second represented by one velocity register unit, before microstep scaling.
    #[inline]
    fn velocity_unit(&self) -> f32 {
        self.clock_hz as f32 / TWO_POW_24
    }

    /// Steps per second squared represented by one acceleration register unit.
    #[inline]
    fn acceleration_unit(&self) -> f32 {
        let fclk = self.clock_hz as f32;
        fclk * fclk / ACCEL_PRESCALER / TWO_POW_24
    }

    /// Encode a velocity magnitude in steps/s.
    ///
    /// Direction is not encoded; pass `abs(v)` and select the direction through
    /// the ramp mode where needed.
    #[inline]
    pub fn velocity_to_register(&self, velocity: f32) -> i32 {
        roundf(velocity / self.velocity_unit() * self.microsteps.as_f32()) as i32
    }

    /// Encode an acceleration magnitude in steps/s².
    #[inline]
    pub fn acceleration_to_register(&self, acceleration: f32) -> i32 {
        roundf(acceleration / self.acceleration_unit() * self.microsteps.as_f32()) as i32
    }

    /// Encode a position in steps as a two's-complement microstep count.
    #[inline]
    pub fn position_to_register(&self, position: f32) -> u32 {
        roundf(position * self.microsteps.as_f32()) as i32 as u32
    }

    /// Decode a position register (XACTUAL, XTARGET, XLATCH) into steps.
    #[inline]
    pub fn register_to_position(&self, raw: u32) -> f32 {
        raw as i32 as f32 / self.microsteps.as_f32()
    }

    /// Decode a velocity register value into steps/s.
    #[inline]
    pub fn register_to_velocity(&self, raw: i32) -> f32 {
        raw as f32 / self.microsteps.as_f32() * self.velocity_unit()
    }

    /// Decode an acceleration register value into steps/s².
    #[inline]
    pub fn register_to_acceleration(&self, raw: i32) -> f32 {
        raw as f32 / self.microsteps.as_f32() * self.acceleration_unit()
    }

    /// Decode VACTUAL, a 24-bit two's-complement value, into steps/s.
    #[inline]
    pub fn vactual_to_velocity(&self, raw: u32) -> f32 {
        let signed = ((raw << 8) as i32) >> 8;
        self.register_to_velocity(signed)
    }
}
