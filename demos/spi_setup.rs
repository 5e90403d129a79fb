//! SPI setup example.
//!
//! Demonstrates detecting a TMC5130, writing the driver configuration and
//! running a positioning move with a reference switch latch.
//!
//! This example uses a simulated chip behind an `SpiDevice` so it runs
//! without real hardware.

use embedded_hal::spi::{ErrorKind, ErrorType, Operation, SpiDevice};
use tmc5130::{DriverConfig, Register, SpiTransport, Tmc5130};

/// Delay provider backed by the host clock.
struct StdDelay;

impl embedded_hal::delay::DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(ns as u64));
    }
}

/// Simulated chip answering 40-bit datagrams.
///
/// Like the real device, a read datagram returns the data selected by the
/// previous read. Moves complete instantly.
struct SimulatedChip {
    regs: [u32; 0x80],
    selected: u32,
}

impl SimulatedChip {
    fn new() -> Self {
        let mut regs = [0; 0x80];
        regs[Register::IoInputOutput.addr() as usize] = 0x1100_004F;
        Self { regs, selected: 0 }
    }

    fn datagram(&mut self, tx: &[u8], rx: &mut [u8]) {
        let addr = (tx[0] & 0x7F) as usize;
        let data = u32::from_be_bytes([tx[1], tx[2], tx[3], tx[4]]);

        let reply = self.selected;
        if tx[0] & 0x80 != 0 {
            self.regs[addr] = data;
            if addr == Register::Xtarget.addr() as usize {
                // Arrive at the target, passing the left switch on the way
                self.regs[Register::Xactual.addr() as usize] = data;
                self.regs[Register::Xlatch.addr() as usize] = data / 2;
                self.regs[Register::RampStat.addr() as usize] |= (1 << 9) | (1 << 2);
            }
        } else {
            self.selected = self.regs[addr];
            if addr == Register::RampStat.addr() as usize {
                self.regs[addr] &= !0b11_1100;
            }
        }

        rx[0] = 0x08;
        rx[1..5].copy_from_slice(&reply.to_be_bytes());
    }
}

impl ErrorType for SimulatedChip {
    type Error = ErrorKind;
}

impl SpiDevice<u8> for SimulatedChip {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), ErrorKind> {
        for op in operations {
            match op {
                Operation::Transfer(rx, tx) => self.datagram(tx, rx),
                Operation::DelayNs(_) => {}
                _ => return Err(ErrorKind::Other),
            }
        }
        Ok(())
    }
}

fn main() -> Result<(), tmc5130::Error> {
    println!("=== TMC5130 SPI Setup Example ===\n");

    let transport = SpiTransport::new(SimulatedChip::new(), StdDelay);
    let mut tmc = Tmc5130::new(transport);

    // Detect the chip and write the driver registers
    let config = DriverConfig::default().with_current(8, 24, 6);
    tmc.setup(&config)?;
    println!("Chip detected, status byte: {:?}", tmc.last_status());

    // Ramp: 1 step/s stop velocity, 400 steps/s, 2000 steps/s²
    tmc.set_speed_ramp(0.0, 1.0, 0.0)?;
    tmc.set_speed_limit(400.0)?;
    tmc.set_acceleration_limit(2000.0)?;
    println!(
        "VMAX register for 400 steps/s: {}",
        tmc.converter().velocity_to_register(400.0)
    );

    // Latch the position when the left switch goes active
    tmc.enable_reference_l_latch(true)?;

    tmc.move_to_position(800.0)?;
    while !tmc.target_position_reached()? {}
    println!("Reached position: {} steps", tmc.get_current_position()?);

    match tmc.get_reference_l_latch()? {
        Some(position) => println!("Left switch latched at {} steps", position),
        None => println!("Left switch not seen"),
    }

    tmc.stop()?;
    println!("\n=== Example Complete ===");
    Ok(())
}
