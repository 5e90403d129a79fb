//! Optional motion and reference switch settings applied after setup.

use serde::Deserialize;

use super::units::{StepsPerSec, StepsPerSecSquared};

/// Ramp generator velocities and limits.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RampConfig {
    /// Start velocity (VSTART).
    #[serde(default, rename = "vstart_steps_per_sec")]
    pub vstart: StepsPerSec,

    /// Stop velocity (VSTOP). Must be greater than `vstart`.
    #[serde(rename = "vstop_steps_per_sec")]
    pub vstop: StepsPerSec,

    /// Transition velocity between the A1/D1 and AMAX/DMAX phases (V1).
    #[serde(default, rename = "vtrans_steps_per_sec")]
    pub vtrans: StepsPerSec,

    /// Velocity limit (VMAX).
    #[serde(rename = "max_velocity_steps_per_sec")]
    pub max_velocity: StepsPerSec,

    /// Symmetric acceleration/deceleration limit (AMAX, DMAX, A1, D1).
    #[serde(rename = "max_acceleration_steps_per_sec2")]
    pub max_acceleration: StepsPerSecSquared,
}

/// Reference switch wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct ReferenceConfig {
    /// Swap the REFL and REFR inputs.
    pub swap: bool,

    /// Left switch is active high.
    pub left_active_high: bool,

    /// Right switch is active high.
    pub right_active_high: bool,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            swap: false,
            left_active_high: true,
            right_active_high: true,
        }
    }
}
