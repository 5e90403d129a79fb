//! Builder pattern for Tmc5130.

use crate::config::units::Microsteps;
use crate::config::{ChipConfig, SystemConfig};
use crate::conversion::{UnitConverter, DEFAULT_CLOCK_HZ};
use crate::error::{ConfigError, Error, Result};
use crate::transport::RegisterAccess;

use super::driver::Tmc5130;

/// Builder for creating Tmc5130 instances.
pub struct Tmc5130Builder<T>
where
    T: RegisterAccess,
{
    transport: Option<T>,
    clock_hz: u32,
    microsteps: Microsteps,
}

impl<T> Default for Tmc5130Builder<T>
where
    T: RegisterAccess,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tmc5130Builder<T>
where
    T: RegisterAccess,
{
    /// Create a new builder with the internal clock and 256 microsteps.
    pub fn new() -> Self {
        Self {
            transport: None,
            clock_hz: DEFAULT_CLOCK_HZ,
            microsteps: Microsteps::default(),
        }
    }

    /// Set the register transport.
    pub fn transport(mut self, transport: T) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the chip clock frequency in Hz.
    pub fn clock_hz(mut self, clock_hz: u32) -> Self {
        self.clock_hz = clock_hz;
        self
    }

    /// Set the microstep scale.
    pub fn microsteps(mut self, microsteps: Microsteps) -> Self {
        self.microsteps = microsteps;
        self
    }

    /// Configure from a ChipConfig.
    pub fn chip_config(mut self, config: &ChipConfig) -> Self {
        self.clock_hz = config.clock_hz;
        self.microsteps = config.microsteps;
        self
    }

    /// Configure from the `chip` section of a SystemConfig.
    pub fn from_config(self, config: &SystemConfig) -> Self {
        self.chip_config(&config.chip)
    }

    /// Build the Tmc5130.
    ///
    /// Does not touch the bus; call [`Tmc5130::setup`] afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if no transport was set or the clock is zero.
    pub fn build(self) -> Result<Tmc5130<T>> {
        let transport = self
            .transport
            .ok_or(Error::Config(ConfigError::MissingField("transport")))?;

        if self.clock_hz == 0 {
            return Err(Error::Config(ConfigError::InvalidClockFrequency(
                self.clock_hz,
            )));
        }

        Ok(Tmc5130::with_converter(
            transport,
            UnitConverter::new(self.clock_hz, self.microsteps),
        ))
    }
}
