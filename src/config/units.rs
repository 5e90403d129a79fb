//! Physical quantities used by ramp profiles.
//!
//! Velocities and accelerations are expressed in full steps. [`Microsteps`]
//! is the scale between full steps and the microstep counts the ramp
//! generator works in.

use core::fmt::Write;

use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

/// Velocity in full steps per second.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct StepsPerSec(pub f32);

/// Acceleration in full steps per second squared.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct StepsPerSecSquared(pub f32);

/// Microsteps per full step.
///
/// Always a power of two from 1 to 256, matching what CHOPCONF.MRES can
/// select. Stored as its base-2 exponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Microsteps(u8);

impl Microsteps {
    /// Full steps only.
    pub const FULL: Self = Self(0);
    /// 16 microsteps, the usual interpolated setting.
    pub const SIXTEENTH: Self = Self(4);
    /// 256 microsteps, the internal resolution of the ramp generator.
    pub const NATIVE: Self = Self(8);

    /// Microsteps from a divisor.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidMicrosteps` unless `value` is a power of two up to 256.
    pub fn new(value: u16) -> Result<Self, ConfigError> {
        if value.is_power_of_two() && value <= 256 {
            Ok(Self(value.trailing_zeros() as u8))
        } else {
            Err(ConfigError::InvalidMicrosteps(value))
        }
    }

    /// Microsteps from a CHOPCONF.MRES encoding (0 = 256, 8 = full step).
    ///
    /// Values above 8 are reserved and read as full step, like the chip does.
    #[inline]
    pub const fn from_mres(mres: u8) -> Self {
        if mres >= 8 {
            Self::FULL
        } else {
            Self(8 - mres)
        }
    }

    /// CHOPCONF.MRES encoding of this resolution.
    #[inline]
    pub const fn mres(self) -> u8 {
        8 - self.0
    }

    /// Divisor value.
    #[inline]
    pub const fn value(self) -> u16 {
        1 << self.0
    }

    /// Divisor as a float scale factor.
    #[inline]
    pub fn as_f32(self) -> f32 {
        f32::from(self.value())
    }
}

impl Default for Microsteps {
    fn default() -> Self {
        Self::NATIVE
    }
}

impl TryFrom<u16> for Microsteps {
    type Error = ConfigError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for Microsteps {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u16::deserialize(deserializer)?;
        Microsteps::new(value).map_err(|e| {
            let mut msg = heapless::String::<128>::new();
            let _ = write!(msg, "{}", e);
            serde::de::Error::custom(msg.as_str())
        })
    }
}

/// Shorthand for building unit values from literals.
pub trait UnitExt {
    /// As a velocity in steps/s.
    fn steps_per_sec(self) -> StepsPerSec;
    /// As an acceleration in steps/s².
    fn steps_per_sec_squared(self) -> StepsPerSecSquared;
}

impl UnitExt for f32 {
    #[inline]
    fn steps_per_sec(self) -> StepsPerSec {
        StepsPerSec(self)
    }

    #[inline]
    fn steps_per_sec_squared(self) -> StepsPerSecSquared {
        StepsPerSecSquared(self)
    }
}
