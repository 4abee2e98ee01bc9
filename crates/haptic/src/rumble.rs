//! Simple rumble on top of the effect API.
//!
//! Rumble is a single effect owned by the handle: a sine wave where the
//! device supports one, a left/right effect otherwise.

use hidhaptic_effects::{
    Direction, HapticEffect, HapticFeatures, LeftRightEffect, PeriodicEffect, Waveform,
};
use hidhaptic_errors::{EffectError, HapticError, Result};

use crate::haptic::{Haptic, HandleState, Rumble, create, update};

/// Period of the rumble sine wave in milliseconds.
pub const RUMBLE_PERIOD: u16 = 1000;
/// Magnitude the rumble effect is uploaded with.
pub const RUMBLE_MAGNITUDE: i16 = 0x4000;
/// Length the rumble effect is uploaded with, in milliseconds.
pub const RUMBLE_LENGTH: u32 = 5000;

impl Haptic {
    /// `true` if the device can render rumble.
    pub fn rumble_supported(&self) -> bool {
        self.features()
            .intersects(HapticFeatures::SINE | HapticFeatures::LEFTRIGHT)
    }

    /// Upload the rumble effect. Calling it again does nothing.
    pub fn init_rumble(&self) -> Result<()> {
        self.with_state(|device, state| {
            if state.rumble.is_some() {
                return Ok(());
            }

            let effect = rumble_effect(device.features())?;
            let id = create(device, state, &effect)?;
            state.rumble = Some(Rumble { id, effect });
            Ok(())
        })
    }

    /// Play the rumble at `strength` (clamped to `0.0..=1.0`) for
    /// `length_ms` milliseconds.
    pub fn play_rumble(&self, strength: f32, length_ms: u32) -> Result<()> {
        self.with_state(|device, state| {
            let rumble = initialized(state)?;
            let magnitude = rumble_magnitude(strength);

            let mut effect = rumble.effect;
            match &mut effect {
                HapticEffect::Periodic(periodic) => {
                    periodic.magnitude = magnitude;
                    periodic.replay.length = length_ms;
                }
                HapticEffect::LeftRight(left_right) => {
                    let magnitude = magnitude.unsigned_abs();
                    left_right.large_magnitude = magnitude;
                    left_right.small_magnitude = magnitude;
                    left_right.length = length_ms;
                }
                _ => {}
            }

            update(device, state, rumble.id, &effect)?;
            state.rumble = Some(Rumble { effect, ..rumble });
            device.driver_device().run_effect(rumble.id, 1)
        })
    }

    pub fn stop_rumble(&self) -> Result<()> {
        self.with_state(|device, state| {
            let rumble = initialized(state)?;
            device.driver_device().stop_effect(rumble.id)
        })
    }
}

fn initialized(state: &HandleState) -> Result<Rumble> {
    state.rumble.ok_or_else(|| {
        EffectError::invalid_parameter("rumble", "rumble effect not initialized").into()
    })
}

fn rumble_effect(features: HapticFeatures) -> Result<HapticEffect> {
    if features.contains(HapticFeatures::SINE) {
        let mut sine = PeriodicEffect::new(Waveform::Sine, RUMBLE_PERIOD, RUMBLE_MAGNITUDE);
        sine.direction = Direction::Cartesian { x: 0, y: 0 };
        sine.replay.length = RUMBLE_LENGTH;
        Ok(sine.into())
    } else if features.contains(HapticFeatures::LEFTRIGHT) {
        Ok(LeftRightEffect {
            length: RUMBLE_LENGTH,
            large_magnitude: RUMBLE_MAGNITUDE.unsigned_abs(),
            small_magnitude: RUMBLE_MAGNITUDE.unsigned_abs(),
        }
        .into())
    } else {
        Err(HapticError::unsupported("rumble"))
    }
}

/// Map a strength in `0.0..=1.0` onto an effect magnitude.
#[allow(
    clippy::cast_possible_truncation,
    reason = "strength is clamped to 0.0..=1.0"
)]
fn rumble_magnitude(strength: f32) -> i16 {
    let strength = if strength.is_nan() {
        0.0
    } else {
        strength.clamp(0.0, 1.0)
    };
    (32767.0 * strength) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnitude_clamped() {
        assert_eq!(rumble_magnitude(1.0), 32767);
        assert_eq!(rumble_magnitude(4.0), 32767);
        assert_eq!(rumble_magnitude(-1.0), 0);
        assert_eq!(rumble_magnitude(f32::NAN), 0);
        assert_eq!(rumble_magnitude(0.5), 16383);
    }

    #[test]
    fn test_sine_preferred() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let effect = rumble_effect(HapticFeatures::SINE | HapticFeatures::LEFTRIGHT)?;
        let HapticEffect::Periodic(sine) = effect else {
            return Err("expected a periodic effect".into());
        };
        assert_eq!(sine.waveform, Waveform::Sine);
        assert_eq!(sine.period, 1000);
        assert_eq!(sine.magnitude, 0x4000);
        assert_eq!(sine.replay.length, 5000);
        Ok(())
    }

    #[test]
    fn test_left_right_fallback() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let effect = rumble_effect(HapticFeatures::LEFTRIGHT)?;
        assert_eq!(
            effect,
            HapticEffect::LeftRight(LeftRightEffect {
                length: 5000,
                large_magnitude: 0x4000,
                small_magnitude: 0x4000,
            })
        );
        assert!(rumble_effect(HapticFeatures::CONSTANT).is_err());
        Ok(())
    }
}
