//! Effect calculators.
//!
//! Pure functions from an [`EffectState`] to its instantaneous output.
//! Constant, ramp and periodic effects yield a signed level already
//! projected onto the wheel axis. Condition effects yield coefficients the
//! wheel firmware applies against its own position and velocity.

use crate::effect::{ConditionEffect, ConditionKind, Envelope, HapticEffect, Waveform};
use crate::direction::sin_deg;
use crate::state::EffectState;

/// Condition parameters for the first axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConditionParameters {
    /// Lower deadband edge, springs only.
    pub d1: i32,
    /// Upper deadband edge, springs only.
    pub d2: i32,
    /// Coefficient left of the deadband.
    pub k1: i32,
    /// Coefficient right of the deadband.
    pub k2: i32,
    /// Saturation.
    pub clip: u32,
}

/// Output of one playing effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectOutput {
    /// Signed level to add to the constant-force channel.
    Force(i32),
    /// Parameters replacing a condition channel.
    Condition(ConditionKind, ConditionParameters),
}

/// Compute the output of a playing effect, `None` when it is not playing or
/// has no force rendering.
///
/// # Examples
///
/// ```
/// use hidhaptic_effects::{ConstantEffect, EffectOutput, EffectState, calculate_force};
///
/// let mut state = EffectState::default();
/// state.allocate(&ConstantEffect::new(12000).into(), 0).unwrap();
/// state.play(0, 1);
/// state.advance(5);
/// assert_eq!(calculate_force(&state), Some(EffectOutput::Force(12000)));
/// ```
pub fn calculate_force(state: &EffectState) -> Option<EffectOutput> {
    if !state.is_playing() {
        return None;
    }
    let output = match state.effect() {
        HapticEffect::Constant(_) => EffectOutput::Force(calculate_constant(state)),
        HapticEffect::Ramp(_) => EffectOutput::Force(calculate_ramp(state)),
        HapticEffect::Periodic(_) => EffectOutput::Force(calculate_periodic(state)),
        HapticEffect::Condition(c) => {
            let params = match c.condition {
                ConditionKind::Spring => calculate_spring(c),
                ConditionKind::Damper | ConditionKind::Friction | ConditionKind::Inertia => {
                    calculate_resistance(c)
                }
            };
            EffectOutput::Condition(c.condition, params)
        }
        HapticEffect::LeftRight(_) => return None,
    };
    Some(output)
}

/// Envelope-shaped constant level, projected onto the wheel axis.
pub fn calculate_constant(state: &EffectState) -> i32 {
    let HapticEffect::Constant(constant) = state.effect() else {
        return 0;
    };
    let level = shape(
        i64::from(constant.level),
        &constant.envelope,
        constant.replay.effective_length(),
        elapsed(state),
    );
    project(state, level)
}

/// Ramp level at the current time, projected onto the wheel axis.
///
/// The level moves linearly from `start` to `end` between the attack and
/// fade windows. The attack rises from `attack_level` to `start`, the fade
/// falls from `end` to `fade_level`.
pub fn calculate_ramp(state: &EffectState) -> i32 {
    let HapticEffect::Ramp(ramp) = state.effect() else {
        return 0;
    };
    let env = &ramp.envelope;
    let length = i64::from(ramp.replay.effective_length());
    let attack = i64::from(env.attack_length);
    let fade = i64::from(env.fade_length);
    let start = i64::from(ramp.start);
    let end = i64::from(ramp.end);
    let t = elapsed(state);

    let level = if t < attack {
        let from = signum(start) * i64::from(env.attack_level);
        from + (start - from) * t / attack
    } else if length != 0 && fade != 0 && t >= length - fade {
        let to = signum(end) * i64::from(env.fade_level);
        let into_fade = (t - (length - fade)).min(fade);
        end - (end - to) * into_fade / fade
    } else {
        start + (((t - attack) * state.slope()) >> 16)
    };
    project(state, level)
}

/// Periodic level at the current phase, projected onto the wheel axis.
pub fn calculate_periodic(state: &EffectState) -> i32 {
    let HapticEffect::Periodic(periodic) = state.effect() else {
        return 0;
    };
    let magnitude = shape(
        i64::from(periodic.magnitude),
        &periodic.envelope,
        periodic.replay.effective_length(),
        elapsed(state),
    );
    let phase = i64::from(state.phase());
    let offset = i64::from(periodic.offset);

    let level = match periodic.waveform {
        Waveform::Sine => {
            let wave = sin_deg(phase as f64) * magnitude as f64;
            (offset as f64 + wave) as i64
        }
        Waveform::Square => {
            if phase < 180 {
                offset + magnitude
            } else {
                offset - magnitude
            }
        }
        Waveform::Triangle => {
            let peak = magnitude.abs();
            let wave = (phase * peak * 2 / 360 - peak).abs() * 2 - peak;
            offset + signum(magnitude) * wave
        }
        Waveform::SawtoothUp => offset + phase * magnitude * 2 / 360 - magnitude,
        Waveform::SawtoothDown => offset + magnitude - phase * magnitude * 2 / 360,
    };
    project(state, level)
}

/// Two-sided spring around `center` with a `deadband` wide flat zone.
pub fn calculate_spring(condition: &ConditionEffect) -> ConditionParameters {
    let center = i32::from(condition.center[0]);
    let half_band = i32::from(condition.deadband[0]) / 2;
    ConditionParameters {
        d1: center - half_band,
        d2: center + half_band,
        ..calculate_resistance(condition)
    }
}

/// Damper or friction coefficients.
pub fn calculate_resistance(condition: &ConditionEffect) -> ConditionParameters {
    ConditionParameters {
        d1: 0,
        d2: 0,
        k1: i32::from(condition.left_coeff[0]),
        k2: i32::from(condition.right_coeff[0]),
        clip: u32::from(condition.right_sat[0]),
    }
}

/// Apply attack and fade to a nominal level at `t` ms into the effect.
fn shape(nominal: i64, envelope: &Envelope, length: u32, t: i64) -> i64 {
    let attack = i64::from(envelope.attack_length);
    let fade = i64::from(envelope.fade_length);
    let length = i64::from(length);

    if t < attack {
        let from = signum(nominal) * i64::from(envelope.attack_level);
        return from + (nominal - from) * t / attack;
    }
    if length != 0 && fade != 0 {
        let into_fade = t - (length - fade);
        if into_fade > 0 {
            let to = signum(nominal) * i64::from(envelope.fade_level);
            return nominal - (nominal - to) * into_fade.min(fade) / fade;
        }
    }
    nominal
}

fn elapsed(state: &EffectState) -> i64 {
    i64::try_from(state.time_playing()).unwrap_or(i64::MAX)
}

fn signum(level: i64) -> i64 {
    if level < 0 { -1 } else { 1 }
}

fn project(state: &EffectState, level: i64) -> i32 {
    (state.direction_gain() * level as f64) as i32
}
