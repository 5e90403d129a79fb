//! # tmc5130
//!
//! Driver for the Trinamic TMC5130 stepper motor controller with embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Ramp generator control**: Positioning and velocity moves in physical step units
//! - **embedded-hal 1.0**: Uses `SpiDevice` for register access, `DelayNs` for timing
//! - **no_std compatible**: Core library works without standard library
//! - **Reference switches**: Polarity, swap and position latching with sticky latch events
//! - **Configuration-driven**: Driver registers and ramp limits from TOML profiles
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tmc5130::{DriverConfig, SpiTransport, Tmc5130};
//!
//! let transport = SpiTransport::new(spi_device, delay);
//! let mut tmc = Tmc5130::new(transport);
//!
//! tmc.setup(&DriverConfig::default())?;
//! tmc.set_speed_limit(200.0)?;
//! tmc.set_acceleration_limit(1000.0)?;
//! tmc.move_to_position(400.0)?;
//!
//! while !tmc.target_position_reached()? {}
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `alloc`: Enables heap allocation for no_std with allocator
//! - `defmt`: Enables defmt logging for embedded targets
//! - `log`: Enables logging through the `log` facade

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[cfg(feature = "alloc")]
extern crate alloc;

// This mod MUST go first, so that the others see its macros.
#[macro_use]
mod fmt;

// Core modules
pub mod config;
pub mod controller;
pub mod conversion;
pub mod error;
pub mod registers;
pub mod transport;

// Re-exports for ergonomic API
pub use config::{validate_config, ChipConfig, DriverConfig, RampConfig, ReferenceConfig, SystemConfig};
pub use controller::{LatchFlag, LatchState, ReferenceSwitch, Tmc5130, Tmc5130Builder};
pub use conversion::UnitConverter;
pub use error::{ArgumentError, CommError, ConfigError, Error, Result};
pub use registers::{RampMode, Register, SpiStatus};
pub use transport::{RegisterAccess, SpiTransport};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Microsteps, StepsPerSec, StepsPerSecSquared, UnitExt};
