//! SPI binding of the register transport.
//!
//! Every access is a 40-bit datagram: one address byte (bit 7 set for writes)
//! followed by four big-endian data bytes. The chip answers each datagram with
//! its status byte and the data selected by the *previous* read datagram, so a
//! read takes two datagrams separated by a short pause.

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::{Mode, SpiDevice, MODE_3};

use crate::error::CommError;
use crate::registers::{Register, SpiStatus};

use super::RegisterAccess;

/// SPI mode required by the chip (CPOL=1, CPHA=1).
pub const SPI_MODE: Mode = MODE_3;

/// Highest SCK frequency supported with the internal clock.
pub const MAX_SPI_FREQUENCY_HZ: u32 = 8_000_000;

/// Default pause between the select and fetch datagrams of a read.
pub const DEFAULT_SELECT_DELAY_US: u32 = 10;

const DATAGRAM_LEN: usize = 5;

/// Register transport over an `embedded-hal` SPI device.
///
/// The SPI device must be configured for [`SPI_MODE`], MSB first, at most
/// [`MAX_SPI_FREQUENCY_HZ`]; chip select is handled by the device.
pub struct SpiTransport<SPI, DELAY>
where
    SPI: SpiDevice<u8>,
    DELAY: DelayNs,
{
    spi: SPI,
    delay: DELAY,
    /// Status byte from the last datagram.
    status: Option<SpiStatus>,
    select_delay_us: u32,
}

impl<SPI, DELAY> SpiTransport<SPI, DELAY>
where
    SPI: SpiDevice<u8>,
    DELAY: DelayNs,
{
    /// Create a transport from a configured SPI device and a delay provider.
    pub fn new(spi: SPI, delay: DELAY) -> Self {
        Self {
            spi,
            delay,
            status: None,
            select_delay_us: DEFAULT_SELECT_DELAY_US,
        }
    }

    /// Set the pause between the two datagrams of a read.
    pub fn with_select_delay_us(mut self, us: u32) -> Self {
        self.select_delay_us = us;
        self
    }

    /// Give back the SPI device and delay provider.
    pub fn release(self) -> (SPI, DELAY) {
        (self.spi, self.delay)
    }

    /// Send one datagram and check the status byte of the reply.
    fn exchange(&mut self, datagram: [u8; DATAGRAM_LEN]) -> Result<[u8; DATAGRAM_LEN], CommError> {
        let mut reply = [0u8; DATAGRAM_LEN];
        self.spi
            .transfer(&mut reply, &datagram)
            .map_err(|_| CommError::Bus)?;

        let status = SpiStatus(reply[0]);
        self.status = Some(status);
        if status.is_no_response() {
            warn!("no response to datagram {:#x}", datagram[0]);
            return Err(CommError::NoResponse);
        }

        Ok(reply)
    }
}

impl<SPI, DELAY> RegisterAccess for SpiTransport<SPI, DELAY>
where
    SPI: SpiDevice<u8>,
    DELAY: DelayNs,
{
    fn register_read(&mut self, register: Register) -> Result<u32, CommError> {
        let datagram = [register.read_addr(), 0, 0, 0, 0];

        // First datagram selects the register, its reply carries stale data
        self.exchange(datagram)?;
        self.delay.delay_us(self.select_delay_us);
        let reply = self.exchange(datagram)?;

        let value = u32::from_be_bytes([reply[1], reply[2], reply[3], reply[4]]);
        trace!("read {:#x} = {:#x}", register.addr(), value);
        Ok(value)
    }

    fn register_write(&mut self, register: Register, value: u32) -> Result<(), CommError> {
        let [b3, b2, b1, b0] = value.to_be_bytes();
        self.exchange([register.write_addr(), b3, b2, b1, b0])?;
        trace!("write {:#x} = {:#x}", register.addr(), value);
        Ok(())
    }

    fn status_read(&mut self) -> Result<SpiStatus, CommError> {
        let reply = self.exchange([Register::Gconf.read_addr(), 0, 0, 0, 0])?;
        Ok(SpiStatus(reply[0]))
    }

    fn last_status(&self) -> Option<SpiStatus> {
        self.status
    }
}
