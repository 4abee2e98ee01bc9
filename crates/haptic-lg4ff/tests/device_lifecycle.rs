//! End-to-end tests of the lg4ff device against a recording joystick.
//!
//! These run the real background thread. Effect timing uses a
//! [`ManualClock`], so only the wire traffic is asynchronous and every wait
//! is a bounded poll.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use hidhaptic_driver::{EffectStatus, HapticDevice, HapticDriver};
use hidhaptic_effects::{ConstantEffect, HapticEffect, HapticFeatures};
use hidhaptic_errors::{DeviceError, EffectError, HapticError};
use hidhaptic_hid_common::mock::MockJoystick;
use hidhaptic_lg4ff::{Lg4ffConfig, Lg4ffDevice, Lg4ffDriver, ManualClock};
use tracing_test::traced_test;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const G29: u16 = 0xc24f;
const WHEEL: u16 = 0xc294;

fn driver(clock: &ManualClock) -> Lg4ffDriver {
    Lg4ffDriver::new()
        .with_config(Lg4ffConfig::default())
        .with_clock(Arc::new(clock.clone()))
}

fn open(joystick: &MockJoystick, clock: &ManualClock) -> Result<Lg4ffDevice, HapticError> {
    driver(clock).open_device(Arc::new(joystick.clone()))
}

fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}

fn sent(joystick: &MockJoystick, report: [u8; 7]) -> bool {
    joystick.get_write_history().iter().any(|r| r[..] == report[..])
}

#[test]
#[traced_test]
fn test_open_sends_setup_sequence() -> TestResult {
    let joystick = MockJoystick::new(0x046d, G29);
    let clock = ManualClock::new(0);
    let device = open(&joystick, &clock)?;

    let history = joystick.get_write_history();
    assert_eq!(
        history,
        vec![
            vec![0x0d, 0, 0, 0, 0, 0, 0],
            vec![0x13, 0, 0, 0, 0, 0, 0],
            vec![0x23, 0, 0, 0, 0, 0, 0],
            vec![0x43, 0, 0, 0, 0, 0, 0],
            vec![0x83, 0, 0, 0, 0, 0, 0],
        ]
    );
    assert_eq!(device.num_effects(), 16);
    assert_eq!(device.num_effects_playing(), 16);
    assert_eq!(device.num_axes(), 1);
    assert!(device.features().contains(HapticFeatures::CONSTANT | HapticFeatures::GAIN));
    assert!(!device.features().contains(HapticFeatures::PAUSE));
    device.close();
    Ok(())
}

#[test]
#[traced_test]
fn test_g29_constant_play_and_stop() -> TestResult {
    let joystick = MockJoystick::new(0x046d, G29);
    let clock = ManualClock::new(1_000);
    assert!(driver(&clock).joystick_supported(&joystick));

    let device = open(&joystick, &clock)?;
    joystick.clear_write_history();

    let id = device.new_effect(&ConstantEffect::new(20000).into())?;
    device.run_effect(id, 1)?;
    assert!(wait_for(|| {
        joystick
            .get_write_history()
            .iter()
            .any(|r| r[0] == 0x11 && r[2] != 0)
    }));
    assert_eq!(device.effect_status(id)?, EffectStatus::Playing);

    device.stop_effect(id)?;
    assert!(wait_for(|| sent(&joystick, [0x13, 0, 0, 0, 0, 0, 0])));
    assert_eq!(device.effect_status(id)?, EffectStatus::Stopped);

    device.close();
    Ok(())
}

#[test]
fn test_unsupported_joystick_rejected() {
    let clock = ManualClock::new(0);
    let foreign = MockJoystick::new(0x046d, 0xc000);
    assert!(!driver(&clock).joystick_supported(&foreign));

    let err = open(&foreign, &clock).err();
    assert_eq!(
        err,
        Some(HapticError::Device(DeviceError::UnsupportedDevice {
            vendor_id: 0x046d,
            product_id: 0xc000,
        }))
    );
    assert!(foreign.get_write_history().is_empty());
}

#[test]
fn test_setup_failure_aborts_open() {
    let joystick = MockJoystick::new(0x046d, G29);
    joystick.fail_after(2);
    let err = open(&joystick, &ManualClock::new(0)).err();
    assert!(matches!(
        err,
        Some(HapticError::Device(DeviceError::InitializationFailed { .. }))
    ));
    assert_eq!(joystick.get_write_history().len(), 2);
}

#[test]
fn test_ffex_autocenter_off() -> TestResult {
    let joystick = MockJoystick::new(0x046d, WHEEL).with_version(0x2100);
    let device = open(&joystick, &ManualClock::new(0))?;
    joystick.clear_write_history();

    device.set_autocenter(0)?;
    assert_eq!(
        joystick.get_write_history(),
        vec![vec![0xfe, 0x03, 0, 0, 0, 0, 0]]
    );
    device.close();
    Ok(())
}

#[test]
fn test_standard_autocenter_off_and_on() -> TestResult {
    let joystick = MockJoystick::new(0x046d, G29);
    let device = open(&joystick, &ManualClock::new(0))?;
    joystick.clear_write_history();

    device.set_autocenter(0)?;
    assert_eq!(
        joystick.get_write_history(),
        vec![vec![0xf5, 0, 0, 0, 0, 0, 0]]
    );

    joystick.clear_write_history();
    device.set_autocenter(250)?;
    assert_eq!(
        joystick.get_write_history(),
        vec![
            vec![0xf5, 0, 0, 0, 0, 0, 0],
            vec![0xfe, 0x0d, 0x07, 0x07, 0xff, 0, 0],
            vec![0x14, 0, 0, 0, 0, 0, 0],
        ]
    );
    device.close();
    Ok(())
}

#[test]
fn test_autocenter_write_failure_surfaces() -> TestResult {
    let joystick = MockJoystick::new(0x046d, G29);
    let device = open(&joystick, &ManualClock::new(0))?;
    joystick.set_fail_writes(true);
    let err = device.set_autocenter(40).err();
    assert!(matches!(
        err,
        Some(HapticError::Device(DeviceError::Transport { .. }))
    ));
    joystick.set_fail_writes(false);
    device.close();
    Ok(())
}

#[test]
fn test_seventeenth_effect_fails() -> TestResult {
    let joystick = MockJoystick::new(0x046d, G29);
    let device = open(&joystick, &ManualClock::new(0))?;
    let effect: HapticEffect = ConstantEffect::new(100).into();

    let mut ids = Vec::new();
    for _ in 0..16 {
        ids.push(device.new_effect(&effect)?);
    }
    assert_eq!(
        device.new_effect(&effect).err(),
        Some(HapticError::Effect(EffectError::SlotExhausted { capacity: 16 }))
    );

    device.destroy_effect(ids[9])?;
    assert_eq!(device.new_effect(&effect)?, ids[9]);
    device.close();
    Ok(())
}

#[test]
fn test_pause_and_resume_unsupported() -> TestResult {
    let device = open(&MockJoystick::new(0x046d, G29), &ManualClock::new(0))?;
    assert_eq!(
        device.pause().err(),
        Some(HapticError::Device(DeviceError::Unsupported { feature: "pause" }))
    );
    assert!(device.resume().is_err());
    device.close();
    Ok(())
}

#[test]
fn test_finite_effect_ends_on_its_own() -> TestResult {
    let joystick = MockJoystick::new(0x046d, G29);
    let clock = ManualClock::new(0);
    let device = open(&joystick, &clock)?;
    joystick.clear_write_history();

    let effect = HapticEffect::from(ConstantEffect::new(-15000)).with_length(100);
    let id = device.new_effect(&effect)?;
    device.run_effect(id, 1)?;
    assert!(wait_for(|| joystick.get_write_history().iter().any(|r| r[0] == 0x11)));

    clock.advance(100);
    assert!(wait_for(|| sent(&joystick, [0x13, 0, 0, 0, 0, 0, 0])));
    assert!(wait_for(|| matches!(device.effect_status(id), Ok(EffectStatus::Stopped))));
    device.close();
    Ok(())
}

#[test]
#[traced_test]
fn test_close_stops_playing_effects() -> TestResult {
    let joystick = MockJoystick::new(0x046d, G29);
    let device = open(&joystick, &ManualClock::new(0))?;
    let id = device.new_effect(&ConstantEffect::new(9000).into())?;
    device.run_effect(id, 1)?;
    assert!(wait_for(|| joystick.get_write_history().iter().any(|r| r[0] == 0x11)));

    device.close();
    let history = joystick.get_write_history();
    assert_eq!(history.last(), Some(&vec![0x13, 0, 0, 0, 0, 0, 0]));

    let writes = joystick.write_attempts();
    device.close();
    thread::sleep(Duration::from_millis(10));
    assert_eq!(joystick.write_attempts(), writes);
    Ok(())
}

#[test]
#[traced_test]
fn test_failing_transport_marks_device_lost() -> TestResult {
    let joystick = MockJoystick::new(0x046d, G29);
    let device = open(&joystick, &ManualClock::new(0))?;
    let id = device.new_effect(&ConstantEffect::new(5000).into())?;

    joystick.set_fail_writes(true);
    device.run_effect(id, 1)?;
    assert!(wait_for(|| device.is_device_lost()));
    assert!(device.write_failures() >= 250);

    let err = device.new_effect(&ConstantEffect::new(1).into()).err();
    assert!(matches!(
        err,
        Some(HapticError::Device(DeviceError::DeviceLost { .. }))
    ));
    assert!(matches!(
        device.run_effect(id, 1),
        Err(HapticError::Device(DeviceError::DeviceLost { .. }))
    ));

    device.stop_effect(id)?;
    device.stop_effect(id)?;
    assert_eq!(device.effect_status(id)?, EffectStatus::Stopped);

    joystick.set_fail_writes(false);
    assert!(wait_for(|| !device.is_device_lost()));
    assert_eq!(device.effect_status(id)?, EffectStatus::Stopped);
    assert!(device.destroy_effect(id).is_ok());
    assert!(device.new_effect(&ConstantEffect::new(1).into()).is_ok());
    device.close();
    Ok(())
}
