//! Integration tests for the tmc5130 driver.
//!
//! These tests drive the controller against a simulated register file and
//! check the exact register traffic of each operation.

mod common;

use common::{Access, SimChip};
use tmc5130::config::{RampConfig, ReferenceConfig, SystemConfig};
use tmc5130::{
    ArgumentError, CommError, ConfigError, DriverConfig, Error, LatchFlag, Microsteps, Register,
    ReferenceSwitch, StepsPerSec, StepsPerSecSquared, Tmc5130, UnitConverter,
};

fn ready_chip() -> SimChip {
    let mut chip = SimChip::detected();
    {
        let mut tmc = Tmc5130::new(&mut chip);
        tmc.setup(&DriverConfig::default()).expect("setup should succeed");
    }
    chip.clear_log();
    chip
}

// =============================================================================
// Setup
// =============================================================================

#[test]
fn setup_writes_configuration_in_order() {
    let mut chip = SimChip::detected();
    Tmc5130::new(&mut chip)
        .setup(&DriverConfig::default())
        .expect("setup should succeed");

    assert_eq!(chip.log()[0], Access::Read(Register::IoInputOutput));
    assert_eq!(
        chip.writes(),
        vec![
            (Register::Gstat, 0x0000_0005),
            (Register::Chopconf, 0x0001_00C3),
            (Register::IholdIrun, 0x0006_1F0A),
            (Register::Tpowerdown, 0x0000_000A),
            (Register::Gconf, 0x0000_0004),
            (Register::Tpwmthrs, 0x0000_01F4),
            (Register::Pwmconf, 0x0004_01C8),
            (Register::RampMode, 0),
            (Register::Vstart, 0),
            (Register::V1, 0),
            (Register::Vstop, 10),
            (Register::Vmax, 100),
            (Register::Amax, 10_000),
            (Register::Dmax, 10_000),
            (Register::A1, 10_000),
            (Register::D1, 10_000),
        ]
    );
}

#[test]
fn setup_uses_caller_configuration() {
    let mut chip = SimChip::detected();
    let config = DriverConfig::default()
        .with_current(2, 20, 6)
        .with_stealth_chop(false);
    Tmc5130::new(&mut chip).setup(&config).expect("setup should succeed");

    assert_eq!(chip.get(Register::IholdIrun), 0x0006_1402);
    assert_eq!(chip.get(Register::Gconf), 0);
}

#[test]
fn setup_rejects_wrong_version() {
    let mut chip = SimChip::with_version(0x10);
    let result = Tmc5130::new(&mut chip).setup(&DriverConfig::default());

    assert_eq!(result, Err(Error::DeviceNotFound { version: 0x10 }));
    assert!(chip.writes().is_empty());
}

#[test]
fn setup_rejects_silent_bus() {
    // A floating MISO line reads back as all ones
    let mut chip = SimChip::with_version(0xFF);
    let result = Tmc5130::new(&mut chip).setup(&DriverConfig::default());

    assert_eq!(result, Err(Error::DeviceNotFound { version: 0xFF }));
    assert!(chip.writes().is_empty());
}

#[test]
fn setup_propagates_detection_failure() {
    let mut chip = SimChip::detected();
    chip.fail_next_read(Register::IoInputOutput);
    let result = Tmc5130::new(&mut chip).setup(&DriverConfig::default());

    assert_eq!(result, Err(Error::Comm(CommError::Bus)));
    assert!(chip.log().is_empty());
}

#[test]
fn setup_keeps_writes_before_failure() {
    let mut chip = SimChip::detected();
    chip.fail_writes_to(Register::Pwmconf);
    let result = Tmc5130::new(&mut chip).setup(&DriverConfig::default());

    assert_eq!(result, Err(Error::Comm(CommError::Bus)));
    let writes = chip.writes();
    assert_eq!(writes.len(), 6);
    assert_eq!(writes.last(), Some(&(Register::Tpwmthrs, 0x0000_01F4)));
    // Ramp defaults are never reached
    assert_eq!(chip.get(Register::Vstop), 0);
}

// =============================================================================
// Motion parameters
// =============================================================================

#[test]
fn speed_ramp_ignores_sign() {
    let conv = UnitConverter::default();
    let mut chip = ready_chip();
    Tmc5130::new(&mut chip)
        .set_speed_ramp(-10.0, 20.0, -50.0)
        .expect("speed ramp");

    assert_eq!(
        chip.writes(),
        vec![
            (Register::Vstart, conv.velocity_to_register(10.0) as u32),
            (Register::Vstop, conv.velocity_to_register(20.0) as u32),
            (Register::V1, conv.velocity_to_register(50.0) as u32),
        ]
    );
}

#[test]
fn speed_limit_writes_vmax() {
    let mut chip = ready_chip();
    Tmc5130::new(&mut chip).set_speed_limit(100.0).expect("speed limit");

    assert_eq!(chip.writes(), vec![(Register::Vmax, 32_538)]);
}

#[test]
fn repeated_speed_limit_is_idempotent() {
    let mut chip = ready_chip();
    let mut tmc = Tmc5130::new(&mut chip);
    tmc.set_speed_limit(250.0).expect("first limit");
    tmc.set_speed_limit(250.0).expect("second limit");

    let writes = chip.writes();
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[0], writes[1]);
}

#[test]
fn negative_speed_limit_touches_nothing() {
    let mut chip = ready_chip();
    let result = Tmc5130::new(&mut chip).set_speed_limit(-1.0);

    assert_eq!(
        result,
        Err(Error::InvalidArgument(ArgumentError::NegativeSpeed(-1.0)))
    );
    assert!(chip.log().is_empty());
}

#[test]
fn acceleration_limit_is_symmetric() {
    let mut chip = ready_chip();
    Tmc5130::new(&mut chip)
        .set_acceleration_limit(1000.0)
        .expect("acceleration limit");

    assert_eq!(
        chip.writes(),
        vec![
            (Register::Amax, 3231),
            (Register::Dmax, 3231),
            (Register::A1, 3231),
            (Register::D1, 3231),
        ]
    );
}

#[test]
fn negative_acceleration_limit_touches_nothing() {
    let mut chip = ready_chip();
    let result = Tmc5130::new(&mut chip).set_acceleration_limit(-5.0);

    assert!(matches!(
        result,
        Err(Error::InvalidArgument(ArgumentError::NegativeAcceleration(_)))
    ));
    assert!(chip.log().is_empty());
}

#[test]
fn failed_speed_ramp_stops_at_the_failing_register() {
    let conv = UnitConverter::default();
    let mut chip = ready_chip();
    chip.fail_writes_to(Register::Vstop);
    let result = Tmc5130::new(&mut chip).set_speed_ramp(10.0, 20.0, 50.0);

    assert_eq!(result, Err(Error::Comm(CommError::Bus)));
    assert_eq!(
        chip.writes(),
        vec![(Register::Vstart, conv.velocity_to_register(10.0) as u32)]
    );
}

#[test]
fn failed_acceleration_limit_keeps_earlier_writes() {
    let mut chip = ready_chip();
    chip.fail_writes_to(Register::A1);
    let result = Tmc5130::new(&mut chip).set_acceleration_limit(1000.0);

    assert_eq!(result, Err(Error::Comm(CommError::Bus)));
    assert_eq!(
        chip.writes(),
        vec![(Register::Amax, 3231), (Register::Dmax, 3231)]
    );
    assert_eq!(chip.get(Register::D1), 10_000);
}

// =============================================================================
// Movement
// =============================================================================

#[test]
fn move_to_position_selects_positioning_mode_first() {
    let mut chip = ready_chip();
    chip.set(Register::RampMode, 2);
    Tmc5130::new(&mut chip)
        .move_to_position(100.0)
        .expect("move");

    assert_eq!(
        chip.writes(),
        vec![(Register::RampMode, 0), (Register::Xtarget, 25_600)]
    );
}

#[test]
fn move_to_negative_position() {
    let mut chip = ready_chip();
    Tmc5130::new(&mut chip).move_to_position(-1.5).expect("move");

    assert_eq!(chip.get(Register::Xtarget), (-384i32) as u32);
}

#[test]
fn repeated_move_is_idempotent() {
    let mut chip = ready_chip();
    let mut tmc = Tmc5130::new(&mut chip);
    tmc.move_to_position(42.0).expect("first move");
    tmc.move_to_position(42.0).expect("second move");

    let writes = chip.writes();
    assert_eq!(writes.len(), 4);
    assert_eq!(writes[..2], writes[2..]);
}

#[test]
fn move_at_velocity_selects_direction() {
    let mut chip = ready_chip();
    let mut tmc = Tmc5130::new(&mut chip);
    tmc.move_at_velocity(100.0).expect("forward");
    tmc.move_at_velocity(-100.0).expect("reverse");
    tmc.move_at_velocity(0.0).expect("zero");

    assert_eq!(
        chip.writes(),
        vec![
            (Register::Vmax, 32_538),
            (Register::RampMode, 1),
            (Register::Vmax, 32_538),
            (Register::RampMode, 2),
            (Register::Vmax, 0),
            (Register::RampMode, 1),
        ]
    );
}

#[test]
fn stop_zeroes_vstart_then_vmax() {
    let mut chip = ready_chip();
    chip.set(Register::RampMode, 1);
    Tmc5130::new(&mut chip).stop().expect("stop");

    assert_eq!(
        chip.writes(),
        vec![(Register::Vstart, 0), (Register::Vmax, 0)]
    );
    assert_eq!(chip.get(Register::RampMode), 1);
}

#[test]
fn move_to_position_without_mode_change_sets_no_target() {
    let mut chip = ready_chip();
    chip.fail_writes_to(Register::RampMode);
    let result = Tmc5130::new(&mut chip).move_to_position(100.0);

    assert_eq!(result, Err(Error::Comm(CommError::Bus)));
    assert!(chip.writes().is_empty());
}

#[test]
fn failed_target_write_leaves_positioning_mode_selected() {
    let mut chip = ready_chip();
    chip.set(Register::RampMode, 2);
    chip.fail_writes_to(Register::Xtarget);
    let result = Tmc5130::new(&mut chip).move_to_position(100.0);

    assert_eq!(result, Err(Error::Comm(CommError::Bus)));
    assert_eq!(chip.writes(), vec![(Register::RampMode, 0)]);
    assert_eq!(chip.get(Register::Xtarget), 0);
}

#[test]
fn failed_mode_write_after_vmax_is_reported() {
    let mut chip = ready_chip();
    chip.fail_writes_to(Register::RampMode);
    let result = Tmc5130::new(&mut chip).move_at_velocity(-100.0);

    assert_eq!(result, Err(Error::Comm(CommError::Bus)));
    assert_eq!(chip.writes(), vec![(Register::Vmax, 32_538)]);
    assert_eq!(chip.get(Register::RampMode), 0);
}

#[test]
fn failed_stop_keeps_vstart_write() {
    let mut chip = ready_chip();
    chip.set(Register::Vstart, 7);
    chip.fail_writes_to(Register::Vmax);
    let result = Tmc5130::new(&mut chip).stop();

    assert_eq!(result, Err(Error::Comm(CommError::Bus)));
    assert_eq!(chip.writes(), vec![(Register::Vstart, 0)]);
    assert_eq!(chip.get(Register::Vmax), 100);
}

// =============================================================================
// Queries
// =============================================================================

#[test]
fn current_position_is_signed() {
    let mut chip = ready_chip();
    chip.set(Register::Xactual, (-256i32) as u32);

    let position = Tmc5130::new(&mut chip)
        .get_current_position()
        .expect("position");
    assert_eq!(position, -1.0);
}

#[test]
fn current_velocity_is_sign_extended() {
    let mut chip = ready_chip();
    chip.set(Register::Vactual, (-32_538i32) as u32 & 0x00FF_FFFF);

    let velocity = Tmc5130::new(&mut chip)
        .get_current_velocity()
        .expect("velocity");
    assert!((velocity + 100.0).abs() < 0.01);
}

#[test]
fn target_flags_follow_ramp_status() {
    let mut chip = ready_chip();
    chip.set(Register::RampStat, 1 << 9);
    let mut tmc = Tmc5130::new(&mut chip);

    assert!(tmc.target_position_reached().expect("position flag"));
    assert!(!tmc.target_velocity_reached().expect("velocity flag"));
}

#[test]
fn transport_errors_propagate() {
    let mut chip = ready_chip();
    chip.fail_next_read(Register::RampStat);

    let result = Tmc5130::new(&mut chip).target_position_reached();
    assert_eq!(result, Err(Error::Comm(CommError::Bus)));
}

#[test]
fn status_query_is_optional() {
    let mut chip = ready_chip();
    let mut tmc = Tmc5130::new(&mut chip);

    assert_eq!(tmc.status_read(), Err(Error::Comm(CommError::Unsupported)));
    assert_eq!(tmc.last_status(), None);
}

// =============================================================================
// Reference switches
// =============================================================================

#[test]
fn reference_configuration_preserves_other_bits() {
    let mut chip = ready_chip();
    chip.set(Register::SwMode, 0b11);
    let mut tmc = Tmc5130::new(&mut chip);

    tmc.set_reference_swap(true).expect("swap");
    tmc.set_reference_l_polarity(false).expect("left polarity");
    tmc.set_reference_r_polarity(true).expect("right polarity");
    tmc.enable_reference_r_latch(false).expect("right latch");

    assert_eq!(chip.get(Register::SwMode), 0b1_0001_0111);
    // Every change is a read-modify-write
    assert!(chip
        .log()
        .chunks(2)
        .all(|pair| pair[0] == Access::Read(Register::SwMode)
            && matches!(pair[1], Access::Write(Register::SwMode, _))));
}

#[test]
fn reference_active_reads_switch_state() {
    let mut chip = ready_chip();
    chip.set(Register::RampStat, 0b10);
    let mut tmc = Tmc5130::new(&mut chip);

    assert!(!tmc.reference_l_active().expect("left"));
    assert!(tmc.reference_r_active().expect("right"));
    assert!(tmc
        .reference_active(ReferenceSwitch::Right)
        .expect("right"));
}

#[test]
fn latch_survives_unrelated_status_reads() {
    let mut chip = ready_chip();
    chip.latch_left(1280);
    let mut tmc = Tmc5130::new(&mut chip);

    // Polling something else clears the chip flag, the controller keeps it
    tmc.target_velocity_reached().expect("velocity flag");
    assert_eq!(
        tmc.latch_state().flag(ReferenceSwitch::Left),
        LatchFlag::Latched
    );
    tmc.reference_r_active().expect("right switch");

    assert_eq!(tmc.get_reference_l_latch().expect("latch"), Some(5.0));
    assert_eq!(tmc.get_reference_l_latch().expect("latch"), None);
    assert_eq!(chip.get(Register::RampStat) & 0b1100, 0);
}

#[test]
fn latch_survives_every_status_accessor() {
    let mut chip = ready_chip();
    chip.latch_left(-2560);
    let mut tmc = Tmc5130::new(&mut chip);

    tmc.target_position_reached().expect("position flag");
    tmc.target_velocity_reached().expect("velocity flag");
    tmc.reference_l_active().expect("left switch");

    assert_eq!(tmc.get_reference_l_latch().expect("latch"), Some(-10.0));
}

#[test]
fn latch_is_reported_per_switch() {
    let mut chip = ready_chip();
    chip.latch_right(-512);
    let mut tmc = Tmc5130::new(&mut chip);

    assert_eq!(tmc.get_reference_l_latch().expect("left"), None);
    assert_eq!(
        tmc.get_reference_latch(ReferenceSwitch::Right).expect("right"),
        Some(-2.0)
    );
    assert_eq!(tmc.get_reference_r_latch().expect("right"), None);
}

#[test]
fn no_latch_without_event() {
    let mut chip = ready_chip();
    chip.set(Register::Xlatch, 0x1234);
    let mut tmc = Tmc5130::new(&mut chip);

    assert_eq!(tmc.get_reference_l_latch().expect("left"), None);
    assert_eq!(tmc.get_reference_r_latch().expect("right"), None);
    // XLATCH is only read for a pending event
    assert!(!chip.log().contains(&Access::Read(Register::Xlatch)));
}

#[test]
fn arming_discards_pending_latch() {
    let mut chip = ready_chip();
    chip.latch_left(2560);
    let mut tmc = Tmc5130::new(&mut chip);

    tmc.target_position_reached().expect("position flag");
    assert!(tmc.latch_state().is_latched(ReferenceSwitch::Left));

    tmc.enable_reference_l_latch(true).expect("arm latch");
    assert_eq!(tmc.get_reference_l_latch().expect("latch"), None);
    assert_eq!(chip.get(Register::SwMode), 1 << 5);
}

#[test]
fn arming_one_switch_keeps_the_other() {
    let mut chip = ready_chip();
    chip.latch_right(256);
    let mut tmc = Tmc5130::new(&mut chip);

    tmc.reference_l_active().expect("left switch");
    tmc.enable_reference_latch(ReferenceSwitch::Left, false)
        .expect("arm left latch");

    assert_eq!(tmc.get_reference_r_latch().expect("latch"), Some(1.0));
}

#[test]
fn failed_latch_read_keeps_event_pending() {
    let mut chip = ready_chip();
    chip.latch_left(256);
    chip.fail_next_read(Register::Xlatch);
    let mut tmc = Tmc5130::new(&mut chip);

    assert_eq!(
        tmc.get_reference_l_latch(),
        Err(Error::Comm(CommError::Bus))
    );
    assert_eq!(tmc.get_reference_l_latch().expect("latch"), Some(1.0));
}

#[test]
fn latched_position_reads_xlatch_directly() {
    let mut chip = ready_chip();
    chip.set(Register::Xlatch, 25_600);

    let position = Tmc5130::new(&mut chip)
        .get_latched_position()
        .expect("xlatch");
    assert_eq!(position, 100.0);
}

#[test]
fn failed_switch_mode_read_writes_nothing() {
    let mut chip = ready_chip();
    chip.set(Register::SwMode, 0b11);
    chip.fail_next_read(Register::SwMode);
    chip.fail_next_read(Register::SwMode);
    let mut tmc = Tmc5130::new(&mut chip);

    assert_eq!(
        tmc.set_reference_swap(true),
        Err(Error::Comm(CommError::Bus))
    );
    assert_eq!(
        tmc.set_reference_r_polarity(true),
        Err(Error::Comm(CommError::Bus))
    );
    assert!(chip.log().is_empty());
    assert_eq!(chip.get(Register::SwMode), 0b11);
}

#[test]
fn failed_switch_mode_write_leaves_register_unchanged() {
    let mut chip = ready_chip();
    chip.set(Register::SwMode, 0b11);
    chip.fail_writes_to(Register::SwMode);
    let mut tmc = Tmc5130::new(&mut chip);

    assert_eq!(
        tmc.set_reference_swap(true),
        Err(Error::Comm(CommError::Bus))
    );
    assert_eq!(
        tmc.set_reference_l_polarity(true),
        Err(Error::Comm(CommError::Bus))
    );
    assert_eq!(
        chip.log(),
        [Access::Read(Register::SwMode), Access::Read(Register::SwMode)]
    );
    assert_eq!(chip.get(Register::SwMode), 0b11);
}

#[test]
fn failed_arming_read_still_discards_pending_latch() {
    let mut chip = ready_chip();
    chip.latch_left(256);
    chip.fail_next_read(Register::SwMode);
    let mut tmc = Tmc5130::new(&mut chip);

    tmc.target_position_reached().expect("position flag");
    assert!(tmc.latch_state().is_latched(ReferenceSwitch::Left));

    assert_eq!(
        tmc.enable_reference_l_latch(true),
        Err(Error::Comm(CommError::Bus))
    );
    assert!(!tmc.latch_state().is_latched(ReferenceSwitch::Left));
    assert_eq!(tmc.get_reference_l_latch().expect("latch"), None);
    assert_eq!(chip.get(Register::SwMode), 0);
}

#[test]
fn failed_arming_write_still_discards_pending_latch() {
    let mut chip = ready_chip();
    chip.latch_right(-512);
    chip.fail_writes_to(Register::SwMode);
    let mut tmc = Tmc5130::new(&mut chip);

    tmc.reference_r_active().expect("right switch");
    assert!(tmc.latch_state().is_latched(ReferenceSwitch::Right));

    assert_eq!(
        tmc.enable_reference_r_latch(false),
        Err(Error::Comm(CommError::Bus))
    );
    assert!(!tmc.latch_state().is_latched(ReferenceSwitch::Right));
    assert_eq!(tmc.get_reference_r_latch().expect("latch"), None);
    assert!(chip.writes().is_empty());
    assert_eq!(chip.get(Register::SwMode), 0);
}

// =============================================================================
// Profiles and construction
// =============================================================================

fn profile() -> SystemConfig {
    SystemConfig {
        ramp: Some(RampConfig {
            vstart: StepsPerSec(0.0),
            vstop: StepsPerSec(5.0),
            vtrans: StepsPerSec(0.0),
            max_velocity: StepsPerSec(100.0),
            max_acceleration: StepsPerSecSquared(1000.0),
        }),
        reference: Some(ReferenceConfig {
            swap: true,
            left_active_high: false,
            right_active_high: true,
        }),
        ..Default::default()
    }
}

#[test]
fn configure_applies_profile_after_setup() {
    let conv = UnitConverter::default();
    let mut chip = SimChip::detected();
    Tmc5130::new(&mut chip)
        .configure(&profile())
        .expect("configure");

    let writes = chip.writes();
    assert_eq!(writes.len(), 16 + 3 + 1 + 4 + 3);
    assert_eq!(
        writes[16..24],
        [
            (Register::Vstart, 0),
            (Register::Vstop, conv.velocity_to_register(5.0) as u32),
            (Register::V1, 0),
            (Register::Vmax, 32_538),
            (Register::Amax, 3231),
            (Register::Dmax, 3231),
            (Register::A1, 3231),
            (Register::D1, 3231),
        ]
    );
    assert_eq!(chip.get(Register::SwMode), 0b1_0100);
}

#[test]
fn configure_validates_before_touching_the_chip() {
    let mut config = profile();
    if let Some(ramp) = config.ramp.as_mut() {
        ramp.vstop = StepsPerSec(0.0);
    }

    let mut chip = SimChip::detected();
    let result = Tmc5130::new(&mut chip).configure(&config);

    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidRamp { .. }))
    ));
    assert!(chip.log().is_empty());
}

#[test]
fn configure_rejects_profile_for_another_chip_scale() {
    let mut config = profile();
    config.chip.microsteps = Microsteps::SIXTEENTH;

    let mut chip = SimChip::detected();
    let result = Tmc5130::new(&mut chip).configure(&config);

    assert_eq!(
        result,
        Err(Error::Config(ConfigError::ChipMismatch {
            clock_hz: 13_200_000,
            microsteps: 16,
        }))
    );
    assert!(chip.log().is_empty());
    assert_eq!(chip.get(Register::Vmax), 0);
}

#[test]
fn configure_rejects_profile_for_another_clock() {
    let mut config = profile();
    config.chip.clock_hz = 16_000_000;

    let mut chip = SimChip::detected();
    let result = Tmc5130::new(&mut chip).configure(&config);

    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::ChipMismatch {
            clock_hz: 16_000_000,
            ..
        }))
    ));
    assert!(chip.log().is_empty());
}

#[test]
fn builder_requires_transport() {
    let result = Tmc5130::<SimChip>::builder().build();
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::MissingField("transport")))
    ));
}

#[test]
fn builder_rejects_zero_clock() {
    let result = Tmc5130::builder()
        .transport(SimChip::detected())
        .clock_hz(0)
        .build();
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidClockFrequency(0)))
    ));
}

#[test]
fn builder_microsteps_scale_positions() {
    let mut tmc = Tmc5130::builder()
        .transport(SimChip::detected())
        .microsteps(Microsteps::SIXTEENTH)
        .build()
        .expect("build");
    tmc.move_to_position(10.0).expect("move");

    assert_eq!(tmc.converter().microsteps(), Microsteps::SIXTEENTH);
    let chip = tmc.release();
    assert_eq!(chip.get(Register::Xtarget), 160);
}

#[test]
fn builder_takes_chip_section() {
    let mut config = SystemConfig::default();
    config.chip.clock_hz = 16_000_000;

    let tmc = Tmc5130::builder()
        .from_config(&config)
        .transport(SimChip::detected())
        .build()
        .expect("build");
    assert_eq!(tmc.converter().clock_hz(), 16_000_000);
}
