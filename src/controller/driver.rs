//! TMC5130 motion controller.
//!
//! Generic over any [`RegisterAccess`] transport. Every operation is a short
//! sequence of register transactions that stops at the first failure; writes
//! issued before a failure are not rolled back.

use crate::config::units::Microsteps;
use crate::config::{DriverConfig, SystemConfig};
use crate::conversion::UnitConverter;
use crate::error::{ArgumentError, ConfigError, Error, Result};
use crate::registers::{
    Gstat, IoInputOutput, RampMode, RampStat, Register, SpiStatus, SwMode, TMC5130_VERSION,
};
use crate::transport::RegisterAccess;

use super::builder::Tmc5130Builder;
use super::latch::{LatchState, ReferenceSwitch};

/// Ramp generator values written by setup.
///
/// VSTOP and D1 must never be zero in positioning mode, so they get safe
/// values before the first motion command.
const RAMP_DEFAULTS: [(Register, u32); 9] = [
    (Register::RampMode, RampMode::Positioning.raw()),
    (Register::Vstart, 0),
    (Register::V1, 0),
    (Register::Vstop, 10),
    (Register::Vmax, 100),
    (Register::Amax, 10_000),
    (Register::Dmax, 10_000),
    (Register::A1, 10_000),
    (Register::D1, 10_000),
];

/// TMC5130 motion controller.
///
/// Owns the transport and the sticky latch flags. Calls are blocking and must
/// not be issued concurrently; share the controller behind your own lock if
/// several contexts need it.
#[derive(Debug)]
pub struct Tmc5130<T>
where
    T: RegisterAccess,
{
    /// Register transport.
    transport: T,

    /// Unit conversion fixed at construction.
    converter: UnitConverter,

    /// Latch events seen in RAMP_STAT but not yet consumed.
    latch: LatchState,
}

impl<T> Tmc5130<T>
where
    T: RegisterAccess,
{
    /// Create a controller with the internal 13.2 MHz clock and 256 microsteps.
    pub fn new(transport: T) -> Self {
        Self::with_converter(transport, UnitConverter::default())
    }

    /// Start building a controller.
    pub fn builder() -> Tmc5130Builder<T> {
        Tmc5130Builder::new()
    }

    pub(crate) fn with_converter(transport: T, converter: UnitConverter) -> Self {
        Self {
            transport,
            converter,
            latch: LatchState::default(),
        }
    }

    /// Get the unit converter.
    #[inline]
    pub fn converter(&self) -> &UnitConverter {
        &self.converter
    }

    /// Peek at the sticky latch flags without consuming them.
    #[inline]
    pub fn latch_state(&self) -> LatchState {
        self.latch
    }

    /// Status byte of the most recent transaction, if the transport tracks it.
    #[inline]
    pub fn last_status(&self) -> Option<SpiStatus> {
        self.transport.last_status()
    }

    /// Query the chip status byte.
    ///
    /// # Errors
    ///
    /// `Comm(Unsupported)` if the transport has no status query.
    pub fn status_read(&mut self) -> Result<SpiStatus> {
        Ok(self.transport.status_read()?)
    }

    /// Give back the transport.
    pub fn release(self) -> T {
        self.transport
    }

    // =========================================================================
    // Setup
    // =========================================================================

    /// Detect the chip and write the driver configuration and ramp defaults.
    ///
    /// # Errors
    ///
    /// - `DeviceNotFound` if IOIN does not report version 0x11; nothing is written
    /// - `Comm` if any transaction fails
    pub fn setup(&mut self, config: &DriverConfig) -> Result<()> {
        let ioin = IoInputOutput(self.read(Register::IoInputOutput)?);
        let version = ioin.version();
        if version != TMC5130_VERSION {
            warn!("unexpected chip version {:#x}", version);
            return Err(Error::DeviceNotFound { version });
        }
        info!("TMC5130 detected");

        if config.chopconf.mres() != self.converter.microsteps().mres() {
            warn!(
                "CHOPCONF selects {} microsteps, positions are scaled for {}",
                Microsteps::from_mres(config.chopconf.mres()).value(),
                self.converter.microsteps().value()
            );
        }

        // Clear the reset and charge pump undervoltage flags left from power-on
        let gstat = Gstat::default().with_reset(true).with_uv_cp(true);
        self.write(Register::Gstat, gstat.0)?;

        debug!("writing driver configuration");
        self.write(Register::Chopconf, config.chopconf.0)?;
        self.write(Register::IholdIrun, config.ihold_irun.0)?;
        self.write(Register::Tpowerdown, config.tpowerdown.0)?;
        self.write(Register::Gconf, config.gconf.0)?;
        self.write(Register::Tpwmthrs, config.tpwmthrs.0)?;
        self.write(Register::Pwmconf, config.pwmconf.0)?;

        debug!("writing ramp defaults");
        for (register, value) in RAMP_DEFAULTS {
            self.write(register, value)?;
        }

        Ok(())
    }

    /// Validate a profile, run [`setup`](Self::setup) and apply its optional
    /// ramp and reference sections.
    ///
    /// The `chip` section must match this controller's converter; build the
    /// controller with [`Tmc5130Builder::from_config`] to get one that does.
    ///
    /// # Errors
    ///
    /// `Config` if validation fails or the chip section differs from the
    /// converter (no register is touched), otherwise any error from the
    /// individual steps.
    pub fn configure(&mut self, config: &SystemConfig) -> Result<()> {
        crate::config::validate_config(config)?;

        let chip = config.chip;
        if chip.clock_hz != self.converter.clock_hz()
            || chip.microsteps != self.converter.microsteps()
        {
            warn!(
                "profile chip {} Hz / {} usteps does not match controller",
                chip.clock_hz,
                chip.microsteps.value()
            );
            return Err(Error::Config(ConfigError::ChipMismatch {
                clock_hz: chip.clock_hz,
                microsteps: chip.microsteps.value(),
            }));
        }

        self.setup(&config.driver)?;

        if let Some(ramp) = config.ramp {
            self.set_speed_ramp(ramp.vstart.0, ramp.vstop.0, ramp.vtrans.0)?;
            self.set_speed_limit(ramp.max_velocity.0)?;
            self.set_acceleration_limit(ramp.max_acceleration.0)?;
        }

        if let Some(reference) = config.reference {
            self.set_reference_swap(reference.swap)?;
            self.set_reference_l_polarity(reference.left_active_high)?;
            self.set_reference_r_polarity(reference.right_active_high)?;
        }

        Ok(())
    }

    // =========================================================================
    // Motion parameters
    // =========================================================================

    /// Set start, stop and transition velocities in steps/s.
    ///
    /// Signs are ignored. Writes VSTART, VSTOP, V1 in that order.
    pub fn set_speed_ramp(&mut self, vstart: f32, vstop: f32, vtrans: f32) -> Result<()> {
        self.write_velocity(Register::Vstart, vstart)?;
        self.write_velocity(Register::Vstop, vstop)?;
        self.write_velocity(Register::V1, vtrans)
    }

    /// Set the velocity limit (VMAX) in steps/s.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a negative speed, before any register access.
    pub fn set_speed_limit(&mut self, speed: f32) -> Result<()> {
        if speed < 0.0 {
            warn!("rejected negative speed limit {}", speed);
            return Err(ArgumentError::NegativeSpeed(speed).into());
        }
        self.write_velocity(Register::Vmax, speed)
    }

    /// Set a symmetric acceleration and deceleration limit in steps/s².
    ///
    /// The same value goes to AMAX, DMAX, A1 and D1.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a negative acceleration, before any register access.
    pub fn set_acceleration_limit(&mut self, acceleration: f32) -> Result<()> {
        if acceleration < 0.0 {
            warn!("rejected negative acceleration limit {}", acceleration);
            return Err(ArgumentError::NegativeAcceleration(acceleration).into());
        }

        let raw = self.converter.acceleration_to_register(acceleration) as u32;
        for register in [Register::Amax, Register::Dmax, Register::A1, Register::D1] {
            self.write(register, raw)?;
        }
        Ok(())
    }

    // =========================================================================
    // Movement
    // =========================================================================

    /// Move to an absolute position in steps using the configured ramp.
    ///
    /// Switches to positioning mode before writing XTARGET.
    pub fn move_to_position(&mut self, position: f32) -> Result<()> {
        self.write(Register::RampMode, RampMode::Positioning.raw())?;
        let target = self.converter.position_to_register(position);
        self.write(Register::Xtarget, target)
    }

    /// Run continuously at a signed velocity in steps/s.
    ///
    /// VMAX takes the magnitude; the sign selects the velocity ramp mode.
    pub fn move_at_velocity(&mut self, velocity: f32) -> Result<()> {
        self.write_velocity(Register::Vmax, libm::fabsf(velocity))?;
        self.write(Register::RampMode, RampMode::for_velocity(velocity).raw())
    }

    /// Stop by forcing VSTART and VMAX to zero, whatever the current mode.
    pub fn stop(&mut self) -> Result<()> {
        self.write(Register::Vstart, 0)?;
        self.write(Register::Vmax, 0)
    }

    // =========================================================================
    // Position and status queries
    // =========================================================================

    /// Actual position (XACTUAL) in steps.
    pub fn get_current_position(&mut self) -> Result<f32> {
        let raw = self.read(Register::Xactual)?;
        Ok(self.converter.register_to_position(raw))
    }

    /// Actual velocity (VACTUAL) in steps/s, signed.
    pub fn get_current_velocity(&mut self) -> Result<f32> {
        let raw = self.read(Register::Vactual)?;
        Ok(self.converter.vactual_to_velocity(raw))
    }

    /// Content of XLATCH in steps.
    ///
    /// Does not check whether a latch event happened; use
    /// [`get_reference_latch`](Self::get_reference_latch) for that.
    pub fn get_latched_position(&mut self) -> Result<f32> {
        let raw = self.read(Register::Xlatch)?;
        Ok(self.converter.register_to_position(raw))
    }

    /// Whether XACTUAL has reached XTARGET.
    pub fn target_position_reached(&mut self) -> Result<bool> {
        Ok(self.read_ramp_status()?.position_reached())
    }

    /// Whether VACTUAL has reached VMAX.
    pub fn target_velocity_reached(&mut self) -> Result<bool> {
        Ok(self.read_ramp_status()?.velocity_reached())
    }

    // =========================================================================
    // Reference switches
    // =========================================================================

    /// Swap the left and right reference switch inputs.
    pub fn set_reference_swap(&mut self, swap: bool) -> Result<()> {
        self.modify_sw_mode(|sw| sw.with_swap_lr(swap))
    }

    /// Set the active level of a reference switch input.
    pub fn set_reference_polarity(
        &mut self,
        switch: ReferenceSwitch,
        active_high: bool,
    ) -> Result<()> {
        self.modify_sw_mode(|sw| match switch {
            ReferenceSwitch::Left => sw.with_left_active_high(active_high),
            ReferenceSwitch::Right => sw.with_right_active_high(active_high),
        })
    }

    /// Set the active level of the left reference switch.
    pub fn set_reference_l_polarity(&mut self, active_high: bool) -> Result<()> {
        self.set_reference_polarity(ReferenceSwitch::Left, active_high)
    }

    /// Set the active level of the right reference switch.
    pub fn set_reference_r_polarity(&mut self, active_high: bool) -> Result<()> {
        self.set_reference_polarity(ReferenceSwitch::Right, active_high)
    }

    /// Whether a reference switch is currently active.
    pub fn reference_active(&mut self, switch: ReferenceSwitch) -> Result<bool> {
        let status = self.read_ramp_status()?;
        Ok(match switch {
            ReferenceSwitch::Left => status.status_stop_l(),
            ReferenceSwitch::Right => status.status_stop_r(),
        })
    }

    /// Whether the left reference switch is currently active.
    pub fn reference_l_active(&mut self) -> Result<bool> {
        self.reference_active(ReferenceSwitch::Left)
    }

    /// Whether the right reference switch is currently active.
    pub fn reference_r_active(&mut self) -> Result<bool> {
        self.reference_active(ReferenceSwitch::Right)
    }

    /// Arm the position latch of a reference switch.
    ///
    /// Any pending latch event for that switch is discarded first. With
    /// `on_active` the position is latched when the switch becomes active,
    /// otherwise when it becomes inactive.
    pub fn enable_reference_latch(&mut self, switch: ReferenceSwitch, on_active: bool) -> Result<()> {
        self.latch.discard(switch);
        self.modify_sw_mode(|sw| match switch {
            ReferenceSwitch::Left => sw.with_latch_l(on_active),
            ReferenceSwitch::Right => sw.with_latch_r(on_active),
        })
    }

    /// Arm the position latch of the left reference switch.
    pub fn enable_reference_l_latch(&mut self, on_active: bool) -> Result<()> {
        self.enable_reference_latch(ReferenceSwitch::Left, on_active)
    }

    /// Arm the position latch of the right reference switch.
    pub fn enable_reference_r_latch(&mut self, on_active: bool) -> Result<()> {
        self.enable_reference_latch(ReferenceSwitch::Right, on_active)
    }

    /// Consume the latched position of a reference switch.
    ///
    /// Returns `Some(position)` in steps exactly once per latch event and
    /// `None` while no event is pending. If reading XLATCH fails the event
    /// stays pending.
    pub fn get_reference_latch(&mut self, switch: ReferenceSwitch) -> Result<Option<f32>> {
        self.read_ramp_status()?;
        if !self.latch.is_latched(switch) {
            return Ok(None);
        }

        let position = self.get_latched_position()?;
        self.latch.take(switch);
        debug!("consumed {} latch at {}", switch_name(switch), position);
        Ok(Some(position))
    }

    /// Consume the latched position of the left reference switch.
    pub fn get_reference_l_latch(&mut self) -> Result<Option<f32>> {
        self.get_reference_latch(ReferenceSwitch::Left)
    }

    /// Consume the latched position of the right reference switch.
    pub fn get_reference_r_latch(&mut self) -> Result<Option<f32>> {
        self.get_reference_latch(ReferenceSwitch::Right)
    }

    // =========================================================================
    // Register helpers
    // =========================================================================

    #[inline]
    fn read(&mut self, register: Register) -> Result<u32> {
        Ok(self.transport.register_read(register)?)
    }

    #[inline]
    fn write(&mut self, register: Register, value: u32) -> Result<()> {
        Ok(self.transport.register_write(register, value)?)
    }

    fn write_velocity(&mut self, register: Register, velocity: f32) -> Result<()> {
        let raw = self.converter.velocity_to_register(libm::fabsf(velocity)) as u32;
        self.write(register, raw)
    }

    /// The only place RAMP_STAT is read: its latch bits clear on read and are
    /// folded into the sticky flags before anything else looks at the value.
    fn read_ramp_status(&mut self) -> Result<RampStat> {
        let status = RampStat(self.read(Register::RampStat)?);
        if status.status_latch_l() || status.status_latch_r() {
            debug!(
                "latch event captured (left: {}, right: {})",
                status.status_latch_l(),
                status.status_latch_r()
            );
        }
        self.latch.capture(status);
        Ok(status)
    }

    fn modify_sw_mode(&mut self, f: impl FnOnce(SwMode) -> SwMode) -> Result<()> {
        let current = SwMode(self.read(Register::SwMode)?);
        self.write(Register::SwMode, f(current).0)
    }
}

fn switch_name(switch: ReferenceSwitch) -> &'static str {
    match switch {
        ReferenceSwitch::Left => "left",
        ReferenceSwitch::Right => "right",
    }
}
