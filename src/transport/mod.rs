//! Register transport abstraction.
//!
//! The motion controller is written once against [`RegisterAccess`]; the
//! concrete bus binding lives in [`spi`].

pub mod spi;

pub use spi::SpiTransport;

use crate::error::CommError;
use crate::registers::{Register, SpiStatus};

/// Read and write 32-bit registers by address.
///
/// Implementations hide any bus-level quirks such as the two-phase read
/// sequence. Reading some registers has side effects in hardware (see
/// [`Register::clears_on_read`]).
pub trait RegisterAccess {
    /// Read the current value of a register.
    fn register_read(&mut self, register: Register) -> Result<u32, CommError>;

    /// Write a register. No partial write is observable.
    fn register_write(&mut self, register: Register, value: u32) -> Result<(), CommError>;

    /// Fetch the chip status byte.
    ///
    /// The SPI binding sends a GCONF read datagram for this, which changes the
    /// register whose data the next datagram returns. Optional diagnostic; not
    /// needed for motion control.
    fn status_read(&mut self) -> Result<SpiStatus, CommError> {
        Err(CommError::Unsupported)
    }

    /// Status byte seen during the most recent transaction, if tracked.
    fn last_status(&self) -> Option<SpiStatus> {
        None
    }
}

impl<T: RegisterAccess + ?Sized> RegisterAccess for &mut T {
    #[inline]
    fn register_read(&mut self, register: Register) -> Result<u32, CommError> {
        (**self).register_read(register)
    }

    #[inline]
    fn register_write(&mut self, register: Register, value: u32) -> Result<(), CommError> {
        (**self).register_write(register, value)
    }

    #[inline]
    fn status_read(&mut self) -> Result<SpiStatus, CommError> {
        (**self).status_read()
    }

    #[inline]
    fn last_status(&self) -> Option<SpiStatus> {
        (**self).last_status()
    }
}
