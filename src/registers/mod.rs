//! TMC5130 register map.
//!
//! Addresses are fixed by the hardware. Each register used by the driver has a
//! typed view in [`fields`] that wraps the raw 32-bit value.

pub mod fields;

pub use fields::{
    Chopconf, Gconf, Gstat, IholdIrun, IoInputOutput, Pwmconf, RampStat, SwMode, Tpowerdown,
    Tpwmthrs,
};

/// Hardware version reported in IOIN by a TMC5130.
pub const TMC5130_VERSION: u8 = 0x11;

/// Bit 7 of the address byte selects a write access.
pub const WRITE_FLAG: u8 = 0x80;

/// Mask of the 7-bit register address.
pub const ADDRESS_MASK: u8 = 0x7F;

/// Register addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    // General configuration registers
    /// Global configuration flags
    Gconf = 0x00,
    /// Global status flags
    Gstat = 0x01,
    /// UART transmission counter
    Ifcnt = 0x02,
    /// UART slave configuration
    Slaveconf = 0x03,
    /// Read input pins / write output pins, carries the chip version
    IoInputOutput = 0x04,
    /// Position comparison register
    XCompare = 0x05,

    // Velocity dependent driver feature control registers
    /// Driver current control
    IholdIrun = 0x10,
    /// Delay before power down
    Tpowerdown = 0x11,
    /// Actual time between microsteps
    Tstep = 0x12,
    /// Upper velocity for stealthChop voltage PWM mode
    Tpwmthrs = 0x13,
    /// Lower velocity threshold for coolStep and stallGuard
    Tcoolthrs = 0x14,
    /// Velocity threshold for switching into a different chopper mode and fullstepping
    Thigh = 0x15,

    // Ramp generator motion control registers
    /// Driving mode (velocity, positioning, hold)
    RampMode = 0x20,
    /// Actual motor position
    Xactual = 0x21,
    /// Actual motor velocity from ramp generator (24-bit signed)
    Vactual = 0x22,
    /// Motor start velocity
    Vstart = 0x23,
    /// First acceleration between VSTART and V1
    A1 = 0x24,
    /// First acceleration/deceleration phase threshold velocity
    V1 = 0x25,
    /// Second acceleration between V1 and VMAX
    Amax = 0x26,
    /// Target velocity in velocity mode
    Vmax = 0x27,
    /// Deceleration between VMAX and V1
    Dmax = 0x28,
    /// Deceleration between V1 and VSTOP. Must not be 0 in positioning mode.
    D1 = 0x2A,
    /// Motor stop velocity. Must be > VSTART and not 0 in positioning mode.
    Vstop = 0x2B,
    /// Waiting time after ramping down to zero velocity
    Tzerowait = 0x2C,
    /// Target position for ramp mode
    Xtarget = 0x2D,

    // Ramp generator driver feature control registers
    /// Velocity threshold for enabling automatic commutation dcStep
    Vdcmin = 0x33,
    /// Switch mode configuration
    SwMode = 0x34,
    /// Ramp status and switch event status. Latch and event bits clear on read.
    RampStat = 0x35,
    /// Ramp generator latch position upon programmable switch event
    Xlatch = 0x36,

    // Motor driver registers
    /// Chopper and driver configuration
    Chopconf = 0x6C,
    /// Voltage PWM mode chopper configuration
    Pwmconf = 0x70,
}

impl Register {
    /// 7-bit register address.
    #[inline]
    pub const fn addr(self) -> u8 {
        self as u8
    }

    /// Address byte for a read datagram.
    #[inline]
    pub const fn read_addr(self) -> u8 {
        self.addr() & ADDRESS_MASK
    }

    /// Address byte for a write datagram.
    #[inline]
    pub const fn write_addr(self) -> u8 {
        self.addr() | WRITE_FLAG
    }

    /// Whether reading this register clears some of its bits.
    #[inline]
    pub const fn clears_on_read(self) -> bool {
        matches!(self, Register::RampStat)
    }
}

/// Ramp generator operating mode (RAMPMODE register).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum RampMode {
    /// Move to XTARGET using the configured ramp
    Positioning = 0,
    /// Accelerate towards +VMAX
    VelocityPositive = 1,
    /// Accelerate towards -VMAX
    VelocityNegative = 2,
    /// Keep the current velocity
    Hold = 3,
}

impl RampMode {
    /// Velocity mode for a signed velocity. Zero counts as positive.
    #[inline]
    pub fn for_velocity(velocity: f32) -> Self {
        if velocity < 0.0 {
            RampMode::VelocityNegative
        } else {
            RampMode::VelocityPositive
        }
    }

    /// Raw register value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self as u32
    }
}

/// Status byte clocked out by the chip as the first byte of every datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiStatus(pub u8);

impl SpiStatus {
    /// Value observed when nothing drives MISO.
    pub const NO_RESPONSE: u8 = 0xFF;

    /// Get the raw byte.
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// GSTAT reset flag.
    #[inline]
    pub const fn reset_flag(self) -> bool {
        self.0 & (1 << 0) != 0
    }

    /// GSTAT driver error flag.
    #[inline]
    pub const fn driver_error(self) -> bool {
        self.0 & (1 << 1) != 0
    }

    /// stallGuard2 active.
    #[inline]
    pub const fn stallguard(self) -> bool {
        self.0 & (1 << 2) != 0
    }

    /// Motor at standstill.
    #[inline]
    pub const fn standstill(self) -> bool {
        self.0 & (1 << 3) != 0
    }

    /// Target velocity reached.
    #[inline]
    pub const fn velocity_reached(self) -> bool {
        self.0 & (1 << 4) != 0
    }

    /// Target position reached.
    #[inline]
    pub const fn position_reached(self) -> bool {
        self.0 & (1 << 5) != 0
    }

    /// Left reference switch active.
    #[inline]
    pub const fn status_stop_l(self) -> bool {
        self.0 & (1 << 6) != 0
    }

    /// Right reference switch active.
    #[inline]
    pub const fn status_stop_r(self) -> bool {
        self.0 & (1 << 7) != 0
    }

    /// All ones: the chip did not answer.
    #[inline]
    pub const fn is_no_response(self) -> bool {
        self.0 == Self::NO_RESPONSE
    }
}
