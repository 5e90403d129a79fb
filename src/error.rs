//! Error types for the tmc5130 driver.
//!
//! Provides unified error handling across device detection, register
//! transport, argument checking and profile configuration.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all tmc5130 operations.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The chip did not report the expected hardware version during setup.
    ///
    /// Not worth retrying: check wiring, power and chip select.
    DeviceNotFound {
        /// Version field read from IOIN
        version: u8,
    },
    /// Register transport failure. Device state is unknown afterwards.
    Comm(CommError),
    /// Caller passed an argument the chip cannot represent. No register was touched.
    InvalidArgument(ArgumentError),
    /// Profile parsing or validation error
    Config(ConfigError),
}

/// Transport-level failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommError {
    /// The underlying bus reported an error
    Bus,
    /// The chip answered with an all-ones status byte (MISO not driven)
    NoResponse,
    /// The transport does not provide the requested optional operation
    Unsupported,
}

/// Locally rejected arguments.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArgumentError {
    /// Speed limit must be >= 0
    NegativeSpeed(f32),
    /// Acceleration limit must be >= 0
    NegativeAcceleration(f32),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Invalid microstep value (must be power of 2: 1, 2, 4, 8, 16, 32, 64, 128, 256)
    InvalidMicrosteps(u16),
    /// Clock frequency must be > 0
    InvalidClockFrequency(u32),
    /// A register value sets bits the chip documents as reserved
    ReservedBitsSet {
        /// Register name
        register: &'static str,
        /// Offending raw value
        value: u32,
    },
    /// Ramp velocity must be >= 0
    NegativeVelocity(f32),
    /// Ramp acceleration must be >= 0
    NegativeAcceleration(f32),
    /// VSTOP must be greater than VSTART
    InvalidRamp {
        /// Start velocity
        vstart: f32,
        /// Stop velocity
        vstop: f32,
    },
    /// A required builder field was not provided
    MissingField(&'static str),
    /// Profile chip section differs from the controller's unit conversion
    ChipMismatch {
        /// Clock frequency in the profile
        clock_hz: u32,
        /// Microsteps in the profile
        microsteps: u16,
    },
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DeviceNotFound { version } => {
                write!(f, "TMC5130 not found (version {:#04x}, expected 0x11)", version)
            }
            Error::Comm(e) => write!(f, "Communication error: {}", e),
            Error::InvalidArgument(e) => write!(f, "Invalid argument: {}", e),
            Error::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl fmt::Display for CommError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommError::Bus => write!(f, "bus transfer failed"),
            CommError::NoResponse => write!(f, "no response from device"),
            CommError::Unsupported => write!(f, "operation not supported by transport"),
        }
    }
}

impl fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentError::NegativeSpeed(v) => write!(f, "speed {} must not be negative", v),
            ArgumentError::NegativeAcceleration(v) => {
                write!(f, "acceleration {} must not be negative", v)
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidMicrosteps(v) => {
                write!(f, "Invalid microsteps: {}. Valid values: 1, 2, 4, 8, 16, 32, 64, 128, 256", v)
            }
            ConfigError::InvalidClockFrequency(v) => {
                write!(f, "Invalid clock frequency: {} Hz. Must be > 0", v)
            }
            ConfigError::ReservedBitsSet { register, value } => {
                write!(f, "Register {} value {:#010x} sets reserved bits", register, value)
            }
            ConfigError::NegativeVelocity(v) => write!(f, "Invalid velocity: {}. Must be >= 0", v),
            ConfigError::NegativeAcceleration(v) => {
                write!(f, "Invalid acceleration: {}. Must be >= 0", v)
            }
            ConfigError::InvalidRamp { vstart, vstop } => {
                write!(f, "Invalid ramp: vstop ({}) must be > vstart ({})", vstop, vstart)
            }
            ConfigError::MissingField(name) => write!(f, "{} is required", name),
            ConfigError::ChipMismatch { clock_hz, microsteps } => write!(
                f,
                "Profile chip ({} Hz, {} microsteps) does not match the controller",
                clock_hz, microsteps
            ),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

// Conversion impls
impl From<CommError> for Error {
    fn from(e: CommError) -> Self {
        Error::Comm(e)
    }
}

impl From<ArgumentError> for Error {
    fn from(e: ArgumentError) -> Self {
        Error::InvalidArgument(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for CommError {}

#[cfg(feature = "std")]
impl std::error::Error for ArgumentError {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}
