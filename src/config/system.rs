//! System configuration - root configuration structure.

use serde::Deserialize;

use super::chip::ChipConfig;
use super::driver::DriverConfig;
use super::motion::{RampConfig, ReferenceConfig};

/// Root configuration structure from TOML.
///
/// Every section is optional. Missing `chip` and `driver` sections fall back
/// to the chip defaults; missing `ramp` and `reference` sections leave the
/// corresponding registers at their setup values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SystemConfig {
    /// Clock and microstep scale.
    #[serde(default)]
    pub chip: ChipConfig,

    /// Driver registers written during setup.
    #[serde(default)]
    pub driver: DriverConfig,

    /// Ramp generator velocities and limits.
    #[serde(default)]
    pub ramp: Option<RampConfig>,

    /// Reference switch wiring.
    #[serde(default)]
    pub reference: Option<ReferenceConfig>,
}
