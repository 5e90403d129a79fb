//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::{ChipConfig, DriverConfig, RampConfig, SystemConfig};

/// Validate a system configuration.
///
/// Checks:
/// - Clock frequency is non-zero
/// - Driver registers only set documented bits
/// - Ramp velocities and acceleration are non-negative
/// - VSTOP is greater than VSTART
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    validate_chip(&config.chip)?;
    validate_driver(&config.driver)?;

    if let Some(ref ramp) = config.ramp {
        validate_ramp(ramp)?;
    }

    Ok(())
}

fn validate_chip(config: &ChipConfig) -> Result<()> {
    if config.clock_hz == 0 {
        return Err(Error::Config(ConfigError::InvalidClockFrequency(
            config.clock_hz,
        )));
    }

    Ok(())
}

fn validate_driver(config: &DriverConfig) -> Result<()> {
    if let Some((register, value)) = config.reserved_bits().next() {
        return Err(Error::Config(ConfigError::ReservedBitsSet { register, value }));
    }

    Ok(())
}

fn validate_ramp(config: &RampConfig) -> Result<()> {
    for velocity in [config.vstart, config.vstop, config.vtrans, config.max_velocity] {
        if velocity.0 < 0.0 {
            return Err(Error::Config(ConfigError::NegativeVelocity(velocity.0)));
        }
    }

    if config.max_acceleration.0 < 0.0 {
        return Err(Error::Config(ConfigError::NegativeAcceleration(
            config.max_acceleration.0,
        )));
    }

    // The ramp generator needs VSTOP > VSTART to terminate a move
    if config.vstop.0 <= config.vstart.0 {
        return Err(Error::Config(ConfigError::InvalidRamp {
            vstart: config.vstart.0,
            vstop: config.vstop.0,
        }));
    }

    Ok(())
}
