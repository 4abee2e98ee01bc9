//! Device-level settings

use std::thread;
use std::time::Duration;

use anyhow::Result;
use hidhaptic::Haptic;
use hidhaptic_effects::{ConstantEffect, HapticEffect};
use tracing::info;

use crate::commands::Session;
use crate::error::CliError;
use crate::output;
use crate::wheels::Selector;

/// Level of the gain test pulse.
const PULSE_LEVEL: i16 = 0x4000;

/// Set the autocenter strength in percent
pub fn autocenter(selector: Option<Selector>, value: i32, json: bool) -> Result<()> {
    let session = Session::open(selector)?;
    let result = session.haptic.set_autocenter(value);
    session.close();
    result.map_err(CliError::from)?;

    info!(autocenter = value, "Autocenter set");
    output::print_success(&format!("Autocenter set to {value}%"), json);
    Ok(())
}

/// Set the gain in percent and play a constant pulse at that gain
///
/// The gain lasts as long as the device stays open, so the pulse is how the
/// setting can be felt.
pub fn gain(selector: Option<Selector>, value: i32, pulse_ms: u32, json: bool) -> Result<()> {
    let session = Session::open(selector)?;
    let result = play_pulse(&session.haptic, value, pulse_ms);
    session.close();
    result.map_err(CliError::from)?;

    info!(gain = value, pulse_ms, "Gain set");
    output::print_success(&format!("Gain set to {value}%"), json);
    Ok(())
}

fn play_pulse(haptic: &Haptic, gain: i32, pulse_ms: u32) -> hidhaptic::Result<()> {
    haptic.set_gain(gain)?;
    let pulse = HapticEffect::from(ConstantEffect::new(PULSE_LEVEL)).with_length(pulse_ms);
    let id = haptic.new_effect(&pulse)?;
    haptic.run_effect(id, 1)?;
    thread::sleep(Duration::from_millis(u64::from(pulse_ms)));
    haptic.destroy_effect(id)
}
