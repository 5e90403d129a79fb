//! Configuration module for tmc5130.
//!
//! Provides the register configuration consumed by setup, the chip
//! parameters fixing the unit conversion, and TOML profile loading (with the
//! `std` feature).

mod chip;
mod driver;
mod motion;
mod system;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use chip::ChipConfig;
pub use driver::DriverConfig;
pub use motion::{RampConfig, ReferenceConfig};
pub use system::SystemConfig;
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Microsteps, StepsPerSec, StepsPerSecSquared};
