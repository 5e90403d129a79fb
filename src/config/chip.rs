//! Chip clock and microstep scale.

use serde::Deserialize;

use crate::conversion::{UnitConverter, DEFAULT_CLOCK_HZ};

use super::units::Microsteps;

/// Parameters that fix the unit conversion for one chip instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct ChipConfig {
    /// Clock frequency in Hz (internal oscillator: 13.2 MHz).
    pub clock_hz: u32,

    /// Microsteps per full step used to scale positions and velocities.
    pub microsteps: Microsteps,
}

impl Default for ChipConfig {
    fn default() -> Self {
        Self {
            clock_hz: DEFAULT_CLOCK_HZ,
            microsteps: Microsteps::default(),
        }
    }
}

impl ChipConfig {
    /// Unit converter for this chip.
    pub fn converter(&self) -> UnitConverter {
        UnitConverter::new(self.clock_hz, self.microsteps)
    }
}
