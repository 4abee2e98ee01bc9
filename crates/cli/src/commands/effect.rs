//! Effect playback commands

use std::thread;
use std::time::Duration;

use anyhow::Result;
use hidhaptic::{EffectStatus, Haptic};
use hidhaptic_effects::{
    ConditionEffect, ConditionKind, ConstantEffect, Direction, Envelope, HapticEffect,
    PeriodicEffect, RampEffect, Waveform,
};
use tracing::{info, warn};

use crate::commands::Session;
use crate::error::CliError;
use crate::output;
use crate::wheels::Selector;

/// Load an effect from inline JSON, or from a file when prefixed with `@`.
pub fn parse_effect(arg: &str) -> Result<HapticEffect, CliError> {
    let text = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)?,
        None => arg.to_string(),
    };
    let effect: HapticEffect = serde_json::from_str(&text)?;
    effect
        .validate()
        .map_err(|e| CliError::InvalidEffect(e.to_string()))?;
    Ok(effect)
}

/// The demo sequence: one effect of each kind the wheel can render.
pub fn demo_effects(length: u32) -> Vec<(&'static str, HapticEffect)> {
    let envelope = Envelope {
        attack_length: 1000,
        fade_length: 1000,
        ..Envelope::default()
    };
    let mut spring = ConditionEffect::new(ConditionKind::Spring, 0x2000, 0xffff);
    spring.center = [0x1000; hidhaptic_effects::CONDITION_AXES];

    vec![
        (
            "Sine Wave",
            HapticEffect::from(PeriodicEffect::new(Waveform::Sine, 1000, 0x2000))
                .with_envelope(envelope),
        ),
        (
            "Square Wave",
            HapticEffect::from(PeriodicEffect::new(Waveform::Square, 400, 0x2000))
                .with_envelope(envelope),
        ),
        (
            "Triangle Wave",
            HapticEffect::from(PeriodicEffect::new(Waveform::Triangle, 750, 0x3000))
                .with_envelope(envelope),
        ),
        (
            "Sawtooth Up",
            HapticEffect::from(PeriodicEffect::new(Waveform::SawtoothUp, 500, 0x5000))
                .with_envelope(envelope),
        ),
        (
            "Sawtooth Down",
            HapticEffect::from(PeriodicEffect::new(Waveform::SawtoothDown, 500, 0x5000))
                .with_envelope(envelope),
        ),
        (
            "Constant Force",
            HapticEffect::from(ConstantEffect::new(0x6000))
                .with_direction(Direction::Polar { dir: 20000 })
                .with_envelope(envelope),
        ),
        ("Condition Spring", spring.into()),
        (
            "Condition Damper",
            ConditionEffect::new(ConditionKind::Damper, 0x2000, 0xffff).into(),
        ),
        (
            "Condition Friction",
            ConditionEffect::new(ConditionKind::Friction, 0x2000, 0xffff).into(),
        ),
        (
            "Ramp",
            HapticEffect::from(RampEffect::new(0x4000, -0x4000))
                .with_direction(Direction::Cartesian { x: 1, y: -1 })
                .with_envelope(envelope),
        ),
    ]
    .into_iter()
    .map(|(name, effect)| (name, effect.with_length(length)))
    .collect()
}

/// Upload every supported demo effect, then play them one after another
pub fn demo(selector: Option<Selector>, length: u32, gap: u32, json: bool) -> Result<()> {
    let session = Session::open(selector)?;
    let result = run_demo(&session.haptic, length, gap, json);
    session.close();
    result
}

fn run_demo(haptic: &Haptic, length: u32, gap: u32, json: bool) -> Result<()> {
    let mut uploaded = Vec::new();
    for (name, effect) in demo_effects(length) {
        if !haptic.effect_supported(&effect) {
            warn!(effect = name, "Skipping unsupported effect");
            continue;
        }
        let id = haptic.new_effect(&effect).map_err(CliError::from)?;
        info!(effect = name, id = %id, "Uploaded effect");
        uploaded.push((name, id));
    }

    for (name, id) in uploaded {
        output::print_progress(&format!("Playing {name}"), json);
        haptic.run_effect(id, 1).map_err(CliError::from)?;
        thread::sleep(Duration::from_millis(u64::from(length) + u64::from(gap)));
    }
    output::print_success("Demo finished", json);
    Ok(())
}

/// Play one effect described in JSON
pub fn play(
    selector: Option<Selector>,
    effect: &str,
    iterations: u32,
    wait_ms: u64,
    json: bool,
) -> Result<()> {
    let effect = parse_effect(effect)?;
    let session = Session::open(selector)?;
    let result = play_effect(&session.haptic, &effect, iterations, wait_ms, json);
    session.close();
    result
}

fn play_effect(
    haptic: &Haptic,
    effect: &HapticEffect,
    iterations: u32,
    wait_ms: u64,
    json: bool,
) -> Result<()> {
    if !haptic.effect_supported(effect) {
        return Err(CliError::UnsupportedEffect(effect.kind().name()).into());
    }

    let id = haptic.new_effect(effect).map_err(CliError::from)?;
    haptic.run_effect(id, iterations).map_err(CliError::from)?;
    output::print_progress(&format!("Playing {} as effect {id}", effect.kind()), json);

    // Infinite effects play for `wait_ms`; finite ones until they end.
    let deadline = std::time::Instant::now() + Duration::from_millis(wait_ms);
    while std::time::Instant::now() < deadline {
        if haptic.effect_status(id).map_err(CliError::from)? == EffectStatus::Stopped {
            break;
        }
        thread::sleep(Duration::from_millis(50));
    }

    haptic.destroy_effect(id).map_err(CliError::from)?;
    output::print_success("Effect finished", json);
    Ok(())
}

/// Play the simple rumble at `strength` for `length` milliseconds
pub fn rumble(selector: Option<Selector>, strength: f32, length: u32, json: bool) -> Result<()> {
    let session = Session::open(selector)?;
    let result = play_rumble(&session.haptic, strength, length);
    session.close();
    result.map_err(CliError::from)?;
    output::print_success("Rumble finished", json);
    Ok(())
}

fn play_rumble(haptic: &Haptic, strength: f32, length: u32) -> hidhaptic::Result<()> {
    haptic.init_rumble()?;
    haptic.play_rumble(strength, length)?;
    thread::sleep(Duration::from_millis(u64::from(length)));
    haptic.stop_rumble()
}
