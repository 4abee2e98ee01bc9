//! Haptic effect definitions
//!
//! A [`HapticEffect`] is a plain value owned by the caller and copied into
//! the device when uploaded. Levels and magnitudes are signed 16-bit,
//! lengths are milliseconds.

use hidhaptic_errors::EffectError;
use serde::{Deserialize, Serialize};

use crate::constants::{CONDITION_AXES, HAPTIC_INFINITY};
use crate::direction::Direction;
use crate::features::HapticFeatures;

/// Every effect kind the haptic API can describe
///
/// # Examples
///
/// ```
/// use hidhaptic_effects::{EffectKind, HapticFeatures};
///
/// assert_eq!(EffectKind::Sine.name(), "sine");
/// assert_eq!(EffectKind::Spring.feature(), HapticFeatures::SPRING);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Constant,
    Sine,
    Square,
    Triangle,
    SawtoothUp,
    SawtoothDown,
    Ramp,
    Spring,
    Damper,
    Inertia,
    Friction,
    LeftRight,
}

impl EffectKind {
    pub const ALL: [EffectKind; 12] = [
        EffectKind::Constant,
        EffectKind::Sine,
        EffectKind::Square,
        EffectKind::Triangle,
        EffectKind::SawtoothUp,
        EffectKind::SawtoothDown,
        EffectKind::Ramp,
        EffectKind::Spring,
        EffectKind::Damper,
        EffectKind::Inertia,
        EffectKind::Friction,
        EffectKind::LeftRight,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EffectKind::Constant => "constant",
            EffectKind::Sine => "sine",
            EffectKind::Square => "square",
            EffectKind::Triangle => "triangle",
            EffectKind::SawtoothUp => "sawtooth_up",
            EffectKind::SawtoothDown => "sawtooth_down",
            EffectKind::Ramp => "ramp",
            EffectKind::Spring => "spring",
            EffectKind::Damper => "damper",
            EffectKind::Inertia => "inertia",
            EffectKind::Friction => "friction",
            EffectKind::LeftRight => "left_right",
        }
    }

    /// The feature bit a device must report to accept this kind.
    pub fn feature(self) -> HapticFeatures {
        match self {
            EffectKind::Constant => HapticFeatures::CONSTANT,
            EffectKind::Sine => HapticFeatures::SINE,
            EffectKind::Square => HapticFeatures::SQUARE,
            EffectKind::Triangle => HapticFeatures::TRIANGLE,
            EffectKind::SawtoothUp => HapticFeatures::SAWTOOTHUP,
            EffectKind::SawtoothDown => HapticFeatures::SAWTOOTHDOWN,
            EffectKind::Ramp => HapticFeatures::RAMP,
            EffectKind::Spring => HapticFeatures::SPRING,
            EffectKind::Damper => HapticFeatures::DAMPER,
            EffectKind::Inertia => HapticFeatures::INERTIA,
            EffectKind::Friction => HapticFeatures::FRICTION,
            EffectKind::LeftRight => HapticFeatures::LEFTRIGHT,
        }
    }

    pub fn is_periodic(self) -> bool {
        matches!(
            self,
            EffectKind::Sine
                | EffectKind::Square
                | EffectKind::Triangle
                | EffectKind::SawtoothUp
                | EffectKind::SawtoothDown
        )
    }

    pub fn is_condition(self) -> bool {
        matches!(
            self,
            EffectKind::Spring | EffectKind::Damper | EffectKind::Inertia | EffectKind::Friction
        )
    }
}

impl std::fmt::Display for EffectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Replay timing
///
/// A `length` of 0 or [`HAPTIC_INFINITY`] plays until stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Replay {
    /// Duration in milliseconds
    pub length: u32,
    /// Delay before the effect starts, in milliseconds
    pub delay: u16,
}

impl Replay {
    /// Length in milliseconds, 0 meaning infinite.
    pub fn effective_length(&self) -> u32 {
        if self.length == HAPTIC_INFINITY {
            0
        } else {
            self.length
        }
    }
}

/// Attack and fade envelope
///
/// The magnitude ramps from `attack_level` to the nominal level over
/// `attack_length` ms, and from the nominal level to `fade_level` over the
/// last `fade_length` ms of a finite effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Envelope {
    pub attack_length: u16,
    pub attack_level: u16,
    pub fade_length: u16,
    pub fade_level: u16,
}

/// Constant force
///
/// # Examples
///
/// ```
/// use hidhaptic_effects::{ConstantEffect, HapticEffect, EffectKind};
///
/// let effect: HapticEffect = ConstantEffect::new(20000).with_length(500).into();
/// assert_eq!(effect.kind(), EffectKind::Constant);
/// assert_eq!(effect.replay().length, 500);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstantEffect {
    pub direction: Direction,
    #[serde(flatten)]
    pub replay: Replay,
    pub level: i16,
    #[serde(flatten)]
    pub envelope: Envelope,
}

impl ConstantEffect {
    pub fn new(level: i16) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }
}

/// Linear ramp from `start` to `end` over the replay length
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RampEffect {
    pub direction: Direction,
    #[serde(flatten)]
    pub replay: Replay,
    pub start: i16,
    pub end: i16,
    #[serde(flatten)]
    pub envelope: Envelope,
}

impl RampEffect {
    pub fn new(start: i16, end: i16) -> Self {
        Self {
            start,
            end,
            ..Self::default()
        }
    }
}

/// Shape of a periodic effect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Triangle,
    SawtoothUp,
    SawtoothDown,
}

impl Waveform {
    pub fn kind(self) -> EffectKind {
        match self {
            Waveform::Sine => EffectKind::Sine,
            Waveform::Square => EffectKind::Square,
            Waveform::Triangle => EffectKind::Triangle,
            Waveform::SawtoothUp => EffectKind::SawtoothUp,
            Waveform::SawtoothDown => EffectKind::SawtoothDown,
        }
    }
}

/// Periodic waveform around `offset`
///
/// # Examples
///
/// ```
/// use hidhaptic_effects::{PeriodicEffect, Waveform};
///
/// let wave = PeriodicEffect::new(Waveform::Triangle, 250, 12000);
/// assert_eq!(wave.period, 250);
/// assert_eq!(wave.offset, 0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodicEffect {
    pub waveform: Waveform,
    pub direction: Direction,
    #[serde(flatten)]
    pub replay: Replay,
    /// Period in milliseconds, must be non-zero
    pub period: u16,
    pub magnitude: i16,
    pub offset: i16,
    /// Phase shift, scaled against `period`
    pub phase: u16,
    #[serde(flatten)]
    pub envelope: Envelope,
}

impl PeriodicEffect {
    pub fn new(waveform: Waveform, period: u16, magnitude: i16) -> Self {
        Self {
            waveform,
            period,
            magnitude,
            ..Self::default()
        }
    }
}

/// Which condition a [`ConditionEffect`] describes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    /// Force from position
    #[default]
    Spring,
    /// Force from velocity
    Damper,
    /// Force from acceleration
    Inertia,
    /// Force opposing motion
    Friction,
}

impl ConditionKind {
    pub fn kind(self) -> EffectKind {
        match self {
            ConditionKind::Spring => EffectKind::Spring,
            ConditionKind::Damper => EffectKind::Damper,
            ConditionKind::Inertia => EffectKind::Inertia,
            ConditionKind::Friction => EffectKind::Friction,
        }
    }
}

/// Condition effect, rendered by the device firmware from the wheel state
///
/// Arrays hold one entry per axis; wheels only use the first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionEffect {
    pub condition: ConditionKind,
    pub direction: Direction,
    #[serde(flatten)]
    pub replay: Replay,
    pub right_sat: [u16; CONDITION_AXES],
    pub left_sat: [u16; CONDITION_AXES],
    pub right_coeff: [i16; CONDITION_AXES],
    pub left_coeff: [i16; CONDITION_AXES],
    pub deadband: [u16; CONDITION_AXES],
    pub center: [i16; CONDITION_AXES],
}

impl ConditionEffect {
    /// Symmetric condition on the first axis.
    pub fn new(condition: ConditionKind, coefficient: i16, saturation: u16) -> Self {
        Self {
            condition,
            right_sat: [saturation; CONDITION_AXES],
            left_sat: [saturation; CONDITION_AXES],
            right_coeff: [coefficient; CONDITION_AXES],
            left_coeff: [coefficient; CONDITION_AXES],
            ..Self::default()
        }
    }

    pub fn with_deadband(mut self, center: i16, deadband: u16) -> Self {
        self.center[0] = center;
        self.deadband[0] = deadband;
        self
    }
}

/// Dual-motor rumble
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeftRightEffect {
    pub length: u32,
    pub large_magnitude: u16,
    pub small_magnitude: u16,
}

/// A haptic effect definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HapticEffect {
    Constant(ConstantEffect),
    Ramp(RampEffect),
    Periodic(PeriodicEffect),
    Condition(ConditionEffect),
    LeftRight(LeftRightEffect),
}

impl Default for HapticEffect {
    fn default() -> Self {
        HapticEffect::Constant(ConstantEffect::default())
    }
}

impl HapticEffect {
    pub fn kind(&self) -> EffectKind {
        match self {
            HapticEffect::Constant(_) => EffectKind::Constant,
            HapticEffect::Ramp(_) => EffectKind::Ramp,
            HapticEffect::Periodic(p) => p.waveform.kind(),
            HapticEffect::Condition(c) => c.condition.kind(),
            HapticEffect::LeftRight(_) => EffectKind::LeftRight,
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            HapticEffect::Constant(e) => e.direction,
            HapticEffect::Ramp(e) => e.direction,
            HapticEffect::Periodic(e) => e.direction,
            HapticEffect::Condition(e) => e.direction,
            HapticEffect::LeftRight(_) => Direction::default(),
        }
    }

    pub fn replay(&self) -> Replay {
        match self {
            HapticEffect::Constant(e) => e.replay,
            HapticEffect::Ramp(e) => e.replay,
            HapticEffect::Periodic(e) => e.replay,
            HapticEffect::Condition(e) => e.replay,
            HapticEffect::LeftRight(e) => Replay {
                length: e.length,
                delay: 0,
            },
        }
    }

    /// The envelope, for kinds that carry one.
    pub fn envelope(&self) -> Option<Envelope> {
        match self {
            HapticEffect::Constant(e) => Some(e.envelope),
            HapticEffect::Ramp(e) => Some(e.envelope),
            HapticEffect::Periodic(e) => Some(e.envelope),
            HapticEffect::Condition(_) | HapticEffect::LeftRight(_) => None,
        }
    }

    pub fn replay_mut(&mut self) -> Option<&mut Replay> {
        match self {
            HapticEffect::Constant(e) => Some(&mut e.replay),
            HapticEffect::Ramp(e) => Some(&mut e.replay),
            HapticEffect::Periodic(e) => Some(&mut e.replay),
            HapticEffect::Condition(e) => Some(&mut e.replay),
            HapticEffect::LeftRight(_) => None,
        }
    }

    /// Set the replay length in milliseconds.
    pub fn with_length(mut self, length: u32) -> Self {
        match &mut self {
            HapticEffect::LeftRight(e) => e.length = length,
            other => {
                if let Some(replay) = other.replay_mut() {
                    replay.length = length;
                }
            }
        }
        self
    }

    /// Set the start delay in milliseconds.
    pub fn with_delay(mut self, delay: u16) -> Self {
        if let Some(replay) = self.replay_mut() {
            replay.delay = delay;
        }
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        match &mut self {
            HapticEffect::Constant(e) => e.direction = direction,
            HapticEffect::Ramp(e) => e.direction = direction,
            HapticEffect::Periodic(e) => e.direction = direction,
            HapticEffect::Condition(e) => e.direction = direction,
            HapticEffect::LeftRight(_) => {}
        }
        self
    }

    pub fn with_envelope(mut self, envelope: Envelope) -> Self {
        match &mut self {
            HapticEffect::Constant(e) => e.envelope = envelope,
            HapticEffect::Ramp(e) => e.envelope = envelope,
            HapticEffect::Periodic(e) => e.envelope = envelope,
            HapticEffect::Condition(_) | HapticEffect::LeftRight(_) => {}
        }
        self
    }

    /// Reject definitions no renderer can play.
    pub fn validate(&self) -> Result<(), EffectError> {
        if let HapticEffect::Periodic(p) = self {
            if p.period == 0 {
                return Err(EffectError::invalid_parameter(
                    "period",
                    "periodic effects need a non-zero period",
                ));
            }
        }
        Ok(())
    }
}

impl ConstantEffect {
    pub fn with_length(mut self, length: u32) -> Self {
        self.replay.length = length;
        self
    }
}

impl From<ConstantEffect> for HapticEffect {
    fn from(e: ConstantEffect) -> Self {
        HapticEffect::Constant(e)
    }
}

impl From<RampEffect> for HapticEffect {
    fn from(e: RampEffect) -> Self {
        HapticEffect::Ramp(e)
    }
}

impl From<PeriodicEffect> for HapticEffect {
    fn from(e: PeriodicEffect) -> Self {
        HapticEffect::Periodic(e)
    }
}

impl From<ConditionEffect> for HapticEffect {
    fn from(e: ConditionEffect) -> Self {
        HapticEffect::Condition(e)
    }
}

impl From<LeftRightEffect> for HapticEffect {
    fn from(e: LeftRightEffect) -> Self {
        HapticEffect::LeftRight(e)
    }
}
