//! Driver register configuration written once during setup.

use serde::Deserialize;

use crate::registers::{Chopconf, Gconf, IholdIrun, Pwmconf, Tpowerdown, Tpwmthrs};

/// Chopper, current and PWM configuration.
///
/// Consumed by [`Tmc5130::setup`](crate::Tmc5130::setup); the controller does
/// not keep a copy. Defaults are safe for a typical NEMA17 motor with the
/// internal clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct DriverConfig {
    /// Chopper and driver configuration (CHOPCONF).
    pub chopconf: Chopconf,

    /// Hold and run current (IHOLD_IRUN).
    pub ihold_irun: IholdIrun,

    /// Delay before power down in standstill (TPOWERDOWN).
    pub tpowerdown: Tpowerdown,

    /// Global configuration flags (GCONF).
    pub gconf: Gconf,

    /// Upper velocity for stealthChop (TPWMTHRS).
    pub tpwmthrs: Tpwmthrs,

    /// stealthChop PWM configuration (PWMCONF).
    pub pwmconf: Pwmconf,
}

impl DriverConfig {
    /// Replace the current settings.
    pub fn with_current(mut self, ihold: u8, irun: u8, iholddelay: u8) -> Self {
        self.ihold_irun = IholdIrun::new(ihold, irun, iholddelay);
        self
    }

    /// Enable or disable stealthChop.
    pub fn with_stealth_chop(mut self, enable: bool) -> Self {
        self.gconf = self.gconf.with_en_pwm_mode(enable);
        self
    }

    /// Registers that carry bits outside the documented fields, as `(name, raw)`.
    pub fn reserved_bits(&self) -> impl Iterator<Item = (&'static str, u32)> {
        [
            ("CHOPCONF", self.chopconf.0, Chopconf::VALID_MASK),
            ("IHOLD_IRUN", self.ihold_irun.0, IholdIrun::VALID_MASK),
            ("TPOWERDOWN", self.tpowerdown.0, Tpowerdown::VALID_MASK),
            ("GCONF", self.gconf.0, Gconf::VALID_MASK),
            ("TPWMTHRS", self.tpwmthrs.0, Tpwmthrs::VALID_MASK),
            ("PWMCONF", self.pwmconf.0, Pwmconf::VALID_MASK),
        ]
        .into_iter()
        .filter(|(_, raw, mask)| raw & !mask != 0)
        .map(|(name, raw, _)| (name, raw))
    }
}
