//! Haptic effect definitions, playback state and force calculations
//!
//! This crate holds everything about an effect that does not depend on a
//! particular wheel: the effect model, direction handling, the per-effect
//! playback state machine and the calculators that turn a playing effect
//! into a force level or condition parameters.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod calc;
pub mod constants;
pub mod direction;
pub mod effect;
pub mod features;
pub mod state;

pub use calc::{
    ConditionParameters, EffectOutput, calculate_constant, calculate_force, calculate_periodic,
    calculate_ramp, calculate_resistance, calculate_spring,
};
pub use constants::*;
pub use direction::{Direction, projection_gain};
pub use effect::{
    ConditionEffect, ConditionKind, ConstantEffect, EffectKind, Envelope, HapticEffect,
    LeftRightEffect, PeriodicEffect, RampEffect, Replay, Waveform,
};
pub use features::HapticFeatures;
pub use state::{ActiveDelta, EffectFlags, EffectState, Expiry};
