//! Simulated TMC5130 register file shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;

use tmc5130::{CommError, Register, RegisterAccess};

/// RAMP_STAT bits the chip clears when the register is read.
const CLEAR_ON_READ: u32 = 0b11_1100;

/// One register transaction seen by the simulated chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read(Register),
    Write(Register, u32),
}

/// In-memory chip answering register reads and writes.
pub struct SimChip {
    regs: [u32; 0x80],
    log: Vec<Access>,
    fail_reads: VecDeque<Register>,
    fail_write: Option<Register>,
}

impl SimChip {
    /// A chip reporting the given IOIN version.
    pub fn with_version(version: u8) -> Self {
        let mut chip = Self {
            regs: [0; 0x80],
            log: Vec::new(),
            fail_reads: VecDeque::new(),
            fail_write: None,
        };
        chip.set(Register::IoInputOutput, (u32::from(version) << 24) | 0x4F);
        chip
    }

    /// A genuine TMC5130.
    pub fn detected() -> Self {
        Self::with_version(0x11)
    }

    /// Preset a register without logging an access.
    pub fn set(&mut self, register: Register, value: u32) {
        self.regs[register.addr() as usize] = value;
    }

    /// Current register content.
    pub fn get(&self, register: Register) -> u32 {
        self.regs[register.addr() as usize]
    }

    /// Latch a position on a reference switch, as the ramp generator does.
    pub fn latch_left(&mut self, position_usteps: i32) {
        self.set(Register::Xlatch, position_usteps as u32);
        self.regs[Register::RampStat.addr() as usize] |= 1 << 2;
    }

    /// Latch a position on the right reference switch.
    pub fn latch_right(&mut self, position_usteps: i32) {
        self.set(Register::Xlatch, position_usteps as u32);
        self.regs[Register::RampStat.addr() as usize] |= 1 << 3;
    }

    /// Fail the next read of a register.
    pub fn fail_next_read(&mut self, register: Register) {
        self.fail_reads.push_back(register);
    }

    /// Fail every write to a register.
    pub fn fail_writes_to(&mut self, register: Register) {
        self.fail_write = Some(register);
    }

    /// All transactions so far.
    pub fn log(&self) -> &[Access] {
        &self.log
    }

    /// Writes so far, in order.
    pub fn writes(&self) -> Vec<(Register, u32)> {
        self.log
            .iter()
            .filter_map(|access| match *access {
                Access::Write(register, value) => Some((register, value)),
                Access::Read(_) => None,
            })
            .collect()
    }

    /// Forget the transaction log.
    pub fn clear_log(&mut self) {
        self.log.clear();
    }
}

impl RegisterAccess for SimChip {
    fn register_read(&mut self, register: Register) -> Result<u32, CommError> {
        if self.fail_reads.front() == Some(&register) {
            self.fail_reads.pop_front();
            return Err(CommError::Bus);
        }

        self.log.push(Access::Read(register));
        let value = self.get(register);
        if register.clears_on_read() {
            self.regs[register.addr() as usize] &= !CLEAR_ON_READ;
        }
        Ok(value)
    }

    fn register_write(&mut self, register: Register, value: u32) -> Result<(), CommError> {
        if self.fail_write == Some(register) {
            return Err(CommError::Bus);
        }

        self.log.push(Access::Write(register, value));
        self.set(register, value);
        Ok(())
    }
}
