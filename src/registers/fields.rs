//! Typed views over raw register values.
//!
//! Each view is a transparent `u32` newtype with accessors for the documented
//! bitfields. Views used in configuration profiles deserialize from a plain
//! integer and know which bits the chip reserves.

use serde::Deserialize;

#[inline]
const fn field(raw: u32, shift: u32, width: u32) -> u32 {
    (raw >> shift) & ((1 << width) - 1)
}

#[inline]
const fn with_field(raw: u32, shift: u32, width: u32, value: u32) -> u32 {
    let mask = ((1 << width) - 1) << shift;
    (raw & !mask) | ((value << shift) & mask)
}

#[inline]
const fn bit(raw: u32, n: u32) -> bool {
    raw & (1 << n) != 0
}

#[inline]
const fn with_bit(raw: u32, n: u32, set: bool) -> u32 {
    if set {
        raw | (1 << n)
    } else {
        raw & !(1 << n)
    }
}

/// Global configuration flags (GCONF).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct Gconf(pub u32);

impl Gconf {
    /// Bits the chip defines.
    pub const VALID_MASK: u32 = 0x0003_FFFF;

    /// Use external AIN as current reference.
    #[inline]
    pub const fn i_scale_analog(self) -> bool {
        bit(self.0, 0)
    }

    /// stealthChop voltage PWM mode enabled.
    #[inline]
    pub const fn en_pwm_mode(self) -> bool {
        bit(self.0, 2)
    }

    /// Set stealthChop voltage PWM mode.
    #[inline]
    pub const fn with_en_pwm_mode(self, enable: bool) -> Self {
        Self(with_bit(self.0, 2, enable))
    }

    /// Inverse motor direction.
    #[inline]
    pub const fn shaft(self) -> bool {
        bit(self.0, 4)
    }

    /// Set inverse motor direction.
    #[inline]
    pub const fn with_shaft(self, inverse: bool) -> Self {
        Self(with_bit(self.0, 4, inverse))
    }

    /// Emergency stop on DCIN.
    #[inline]
    pub const fn stop_enable(self) -> bool {
        bit(self.0, 15)
    }
}

impl Default for Gconf {
    /// EN_PWM_MODE=1 enables stealthChop with the default PWMCONF.
    fn default() -> Self {
        Self(0x0000_0004)
    }
}

/// Global status flags (GSTAT). Write 1 to clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Gstat(pub u32);

impl Gstat {
    /// Chip has been reset since the last read.
    #[inline]
    pub const fn reset(self) -> bool {
        bit(self.0, 0)
    }

    /// Set the reset flag bit.
    #[inline]
    pub const fn with_reset(self, set: bool) -> Self {
        Self(with_bit(self.0, 0, set))
    }

    /// Driver shut down due to overtemperature or short circuit.
    #[inline]
    pub const fn drv_err(self) -> bool {
        bit(self.0, 1)
    }

    /// Charge pump undervoltage.
    #[inline]
    pub const fn uv_cp(self) -> bool {
        bit(self.0, 2)
    }

    /// Set the charge pump undervoltage bit.
    #[inline]
    pub const fn with_uv_cp(self, set: bool) -> Self {
        Self(with_bit(self.0, 2, set))
    }
}

/// Input pin states and chip version (IOIN).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IoInputOutput(pub u32);

impl IoInputOutput {
    /// REFL_STEP pin level.
    #[inline]
    pub const fn refl_step(self) -> bool {
        bit(self.0, 0)
    }

    /// REFR_DIR pin level.
    #[inline]
    pub const fn refr_dir(self) -> bool {
        bit(self.0, 1)
    }

    /// DRV_ENN_CFG6 pin level.
    #[inline]
    pub const fn drv_enn(self) -> bool {
        bit(self.0, 4)
    }

    /// Hardware version, 0x11 for the TMC5130.
    #[inline]
    pub const fn version(self) -> u8 {
        field(self.0, 24, 8) as u8
    }
}

/// Driver current control (IHOLD_IRUN).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct IholdIrun(pub u32);

impl IholdIrun {
    /// Bits the chip defines.
    pub const VALID_MASK: u32 = 0x000F_1F1F;

    /// Build from the three fields. Values are truncated to their widths.
    #[inline]
    pub const fn new(ihold: u8, irun: u8, iholddelay: u8) -> Self {
        let raw = with_field(0, 0, 5, ihold as u32);
        let raw = with_field(raw, 8, 5, irun as u32);
        Self(with_field(raw, 16, 4, iholddelay as u32))
    }

    /// Standstill current (0=1/32 .. 31=32/32).
    #[inline]
    pub const fn ihold(self) -> u8 {
        field(self.0, 0, 5) as u8
    }

    /// Motor run current (0=1/32 .. 31=32/32).
    #[inline]
    pub const fn irun(self) -> u8 {
        field(self.0, 8, 5) as u8
    }

    /// Clock cycles for motor power down after standstill, in multiples of 2^18.
    #[inline]
    pub const fn iholddelay(self) -> u8 {
        field(self.0, 16, 4) as u8
    }
}

impl Default for IholdIrun {
    /// IHOLD=10, IRUN=31 (max. current), IHOLDDELAY=6.
    fn default() -> Self {
        Self(0x0006_1F0A)
    }
}

/// Delay before power down in standstill (TPOWERDOWN).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct Tpowerdown(pub u32);

impl Tpowerdown {
    /// Bits the chip defines.
    pub const VALID_MASK: u32 = 0x0000_00FF;

    /// Delay in multiples of 2^18 clocks.
    #[inline]
    pub const fn delay(self) -> u8 {
        field(self.0, 0, 8) as u8
    }
}

impl Default for Tpowerdown {
    fn default() -> Self {
        Self(0x0000_000A)
    }
}

/// Upper velocity for stealthChop voltage PWM mode (TPWMTHRS).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct Tpwmthrs(pub u32);

impl Tpwmthrs {
    /// Bits the chip defines.
    pub const VALID_MASK: u32 = 0x000F_FFFF;

    /// Threshold as TSTEP value.
    #[inline]
    pub const fn threshold(self) -> u32 {
        field(self.0, 0, 20)
    }
}

impl Default for Tpwmthrs {
    /// TPWMTHRS=500, switching at roughly 30 RPM.
    fn default() -> Self {
        Self(0x0000_01F4)
    }
}

/// Chopper and driver configuration (CHOPCONF).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct Chopconf(pub u32);

impl Chopconf {
    /// Bits the chip defines.
    pub const VALID_MASK: u32 = 0x7FFF_FFFF;

    /// Off time, 0 disables the driver.
    #[inline]
    pub const fn toff(self) -> u8 {
        field(self.0, 0, 4) as u8
    }

    /// Set off time.
    #[inline]
    pub const fn with_toff(self, toff: u8) -> Self {
        Self(with_field(self.0, 0, 4, toff as u32))
    }

    /// Hysteresis start value.
    #[inline]
    pub const fn hstrt(self) -> u8 {
        field(self.0, 4, 3) as u8
    }

    /// Hysteresis low value.
    #[inline]
    pub const fn hend(self) -> u8 {
        field(self.0, 7, 4) as u8
    }

    /// Chopper mode: false = spreadCycle, true = constant off time.
    #[inline]
    pub const fn chm(self) -> bool {
        bit(self.0, 14)
    }

    /// Comparator blank time select.
    #[inline]
    pub const fn tbl(self) -> u8 {
        field(self.0, 15, 2) as u8
    }

    /// High sensitivity, low sense resistor voltage.
    #[inline]
    pub const fn vsense(self) -> bool {
        bit(self.0, 17)
    }

    /// Microstep resolution encoding (0 = 256 microsteps).
    #[inline]
    pub const fn mres(self) -> u8 {
        field(self.0, 24, 4) as u8
    }

    /// Interpolation to 256 microsteps.
    #[inline]
    pub const fn intpol(self) -> bool {
        bit(self.0, 28)
    }
}

impl Default for Chopconf {
    /// TOFF=3, HSTRT=4, HEND=1, TBL=2, CHM=0 (spreadCycle).
    fn default() -> Self {
        Self(0x0001_00C3)
    }
}

/// Voltage PWM mode chopper configuration (PWMCONF).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct Pwmconf(pub u32);

impl Pwmconf {
    /// Bits the chip defines.
    pub const VALID_MASK: u32 = 0x003F_FFFF;

    /// User defined amplitude (offset).
    #[inline]
    pub const fn pwm_ampl(self) -> u8 {
        field(self.0, 0, 8) as u8
    }

    /// User defined amplitude (gradient) or regulation loop gradient.
    #[inline]
    pub const fn pwm_grad(self) -> u8 {
        field(self.0, 8, 8) as u8
    }

    /// PWM frequency selection.
    #[inline]
    pub const fn pwm_freq(self) -> u8 {
        field(self.0, 16, 2) as u8
    }

    /// Automatic amplitude scaling.
    #[inline]
    pub const fn pwm_autoscale(self) -> bool {
        bit(self.0, 18)
    }

    /// Standstill option when motor current setting is zero.
    #[inline]
    pub const fn freewheel(self) -> u8 {
        field(self.0, 20, 2) as u8
    }
}

impl Default for Pwmconf {
    /// AUTO=1, 2/1024 fclk, amplitude limit 200, gradient 1.
    fn default() -> Self {
        Self(0x0004_01C8)
    }
}

/// Reference switch and latch configuration (SW_MODE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SwMode(pub u32);

impl SwMode {
    const STOP_L_ENABLE: u32 = 0;
    const STOP_R_ENABLE: u32 = 1;
    const POL_STOP_L: u32 = 2;
    const POL_STOP_R: u32 = 3;
    const SWAP_LR: u32 = 4;
    const LATCH_L_ACTIVE: u32 = 5;
    const LATCH_L_INACTIVE: u32 = 6;
    const LATCH_R_ACTIVE: u32 = 7;
    const LATCH_R_INACTIVE: u32 = 8;

    /// Left switch stops the motor.
    #[inline]
    pub const fn stop_l_enable(self) -> bool {
        bit(self.0, Self::STOP_L_ENABLE)
    }

    /// Right switch stops the motor.
    #[inline]
    pub const fn stop_r_enable(self) -> bool {
        bit(self.0, Self::STOP_R_ENABLE)
    }

    /// REFL and REFR inputs are swapped.
    #[inline]
    pub const fn swap_lr(self) -> bool {
        bit(self.0, Self::SWAP_LR)
    }

    /// Swap REFL and REFR.
    #[inline]
    pub const fn with_swap_lr(self, swap: bool) -> Self {
        Self(with_bit(self.0, Self::SWAP_LR, swap))
    }

    /// Left switch polarity is inverted (low active).
    #[inline]
    pub const fn pol_stop_l(self) -> bool {
        bit(self.0, Self::POL_STOP_L)
    }

    /// Right switch polarity is inverted (low active).
    #[inline]
    pub const fn pol_stop_r(self) -> bool {
        bit(self.0, Self::POL_STOP_R)
    }

    /// Set left switch polarity. Active high clears the inversion bit.
    #[inline]
    pub const fn with_left_active_high(self, active_high: bool) -> Self {
        Self(with_bit(self.0, Self::POL_STOP_L, !active_high))
    }

    /// Set right switch polarity. Active high clears the inversion bit.
    #[inline]
    pub const fn with_right_active_high(self, active_high: bool) -> Self {
        Self(with_bit(self.0, Self::POL_STOP_R, !active_high))
    }

    /// Left latch edge bits as `(latch_on_active, latch_on_inactive)`.
    #[inline]
    pub const fn latch_l(self) -> (bool, bool) {
        (bit(self.0, Self::LATCH_L_ACTIVE), bit(self.0, Self::LATCH_L_INACTIVE))
    }

    /// Right latch edge bits as `(latch_on_active, latch_on_inactive)`.
    #[inline]
    pub const fn latch_r(self) -> (bool, bool) {
        (bit(self.0, Self::LATCH_R_ACTIVE), bit(self.0, Self::LATCH_R_INACTIVE))
    }

    /// Latch XACTUAL on the left switch going active (`true`) or inactive (`false`).
    #[inline]
    pub const fn with_latch_l(self, on_active: bool) -> Self {
        let raw = with_bit(self.0, Self::LATCH_L_ACTIVE, on_active);
        Self(with_bit(raw, Self::LATCH_L_INACTIVE, !on_active))
    }

    /// Latch XACTUAL on the right switch going active (`true`) or inactive (`false`).
    #[inline]
    pub const fn with_latch_r(self, on_active: bool) -> Self {
        let raw = with_bit(self.0, Self::LATCH_R_ACTIVE, on_active);
        Self(with_bit(raw, Self::LATCH_R_INACTIVE, !on_active))
    }
}

/// Ramp and reference switch status (RAMP_STAT).
///
/// `status_latch_*` and `event_*` bits clear when the register is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RampStat(pub u32);

impl RampStat {
    /// Left reference switch active.
    #[inline]
    pub const fn status_stop_l(self) -> bool {
        bit(self.0, 0)
    }

    /// Right reference switch active.
    #[inline]
    pub const fn status_stop_r(self) -> bool {
        bit(self.0, 1)
    }

    /// Left latch ready. Clears on read.
    #[inline]
    pub const fn status_latch_l(self) -> bool {
        bit(self.0, 2)
    }

    /// Right latch ready. Clears on read.
    #[inline]
    pub const fn status_latch_r(self) -> bool {
        bit(self.0, 3)
    }

    /// Motor stopped by the left switch.
    #[inline]
    pub const fn event_stop_l(self) -> bool {
        bit(self.0, 4)
    }

    /// Motor stopped by the right switch.
    #[inline]
    pub const fn event_stop_r(self) -> bool {
        bit(self.0, 5)
    }

    /// Target velocity reached (VACTUAL == VMAX).
    #[inline]
    pub const fn velocity_reached(self) -> bool {
        bit(self.0, 8)
    }

    /// Target position reached (XACTUAL == XTARGET).
    #[inline]
    pub const fn position_reached(self) -> bool {
        bit(self.0, 9)
    }

    /// Actual velocity is zero.
    #[inline]
    pub const fn vzero(self) -> bool {
        bit(self.0, 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_within_valid_masks() {
        assert_eq!(Gconf::default().0 & !Gconf::VALID_MASK, 0);
        assert_eq!(IholdIrun::default().0 & !IholdIrun::VALID_MASK, 0);
        assert_eq!(Chopconf::default().0 & !Chopconf::VALID_MASK, 0);
        assert_eq!(Pwmconf::default().0 & !Pwmconf::VALID_MASK, 0);
    }

    #[test]
    fn test_ihold_irun_fields() {
        let reg = IholdIrun::default();
        assert_eq!(reg.ihold(), 10);
        assert_eq!(reg.irun(), 31);
        assert_eq!(reg.iholddelay(), 6);
        assert_eq!(IholdIrun::new(10, 31, 6), reg);
    }

    #[test]
    fn test_chopconf_default_fields() {
        let reg = Chopconf::default();
        assert_eq!(reg.toff(), 3);
        assert_eq!(reg.hstrt(), 4);
        assert_eq!(reg.hend(), 1);
        assert_eq!(reg.tbl(), 2);
        assert!(!reg.chm());
        assert_eq!(reg.with_toff(0).toff(), 0);
    }

    #[test]
    fn test_io_version() {
        assert_eq!(IoInputOutput(0x1100_0000).version(), 0x11);
        assert_eq!(IoInputOutput(0x10FF_FFFF).version(), 0x10);
    }

    #[test]
    fn test_sw_mode_preserves_other_bits() {
        let reg = SwMode(0b0000_0011);
        let swapped = reg.with_swap_lr(true);
        assert_eq!(swapped.0, 0b0001_0011);
        assert_eq!(swapped.with_swap_lr(false), reg);

        let inverted = reg.with_left_active_high(false);
        assert!(inverted.pol_stop_l());
        assert!(inverted.stop_l_enable() && inverted.stop_r_enable());
    }

    #[test]
    fn test_sw_mode_latch_edges() {
        let reg = SwMode(1 << 6).with_latch_l(true);
        assert_eq!(reg.latch_l(), (true, false));
        let reg = reg.with_latch_l(false);
        assert_eq!(reg.latch_l(), (false, true));

        let reg = SwMode::default().with_latch_r(true);
        assert_eq!(reg.0, 1 << 7);
    }

    #[test]
    fn test_ramp_stat_bits() {
        let stat = RampStat((1 << 9) | (1 << 2));
        assert!(stat.position_reached());
        assert!(stat.status_latch_l());
        assert!(!stat.status_latch_r());
        assert!(!stat.velocity_reached());
    }
}
