//! Per-effect playback state.
//!
//! An [`EffectState`] holds one uploaded effect plus the timing needed to
//! render it. The renderer owns an array of them and drives each through
//! [`EffectState::expire`] and [`EffectState::advance`] once per tick.
//! All times are milliseconds on one monotonic clock.

use bitflags::bitflags;
use hidhaptic_errors::EffectError;

use crate::direction::projection_gain;
use crate::effect::HapticEffect;

bitflags! {
    /// Independent playback flags of an effect.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct EffectFlags: u8 {
        /// Told to run.
        const STARTED = 1 << 0;
        /// Activation timing has been computed.
        const ALLSET = 1 << 1;
        /// Inside the play window.
        const PLAYING = 1 << 2;
        /// A live parameter update is waiting to be applied.
        const UPDATING = 1 << 3;
    }
}

/// Change to the device's active-effect count caused by a play request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveDelta {
    Added,
    Removed,
    Unchanged,
}

/// Outcome of checking a started effect against its stop time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Still inside its window, or infinite.
    Running,
    /// An iteration ended and the next one was armed.
    Repeating,
    /// The last iteration ended. The effect is no longer active.
    Finished,
}

/// Runtime state of one effect slot.
#[derive(Debug, Clone, Default)]
pub struct EffectState {
    effect: HapticEffect,
    flags: EffectFlags,
    allocated: bool,
    start_at: u64,
    play_at: u64,
    stop_at: u64,
    updated_at: u64,
    time_playing: u64,
    count: u32,
    direction_gain: f64,
    slope: i64,
    phase: u32,
    phase_adj: u32,
}

impl EffectState {
    /// Take a free slot for `effect` and upload it.
    pub fn allocate(&mut self, effect: &HapticEffect, now: u64) -> Result<(), EffectError> {
        *self = Self::default();
        self.upload(effect, now)?;
        self.allocated = true;
        Ok(())
    }

    /// Stop the effect and free the slot.
    ///
    /// Returns `true` when the effect was counted as active.
    pub fn release(&mut self) -> bool {
        let was_started = self.is_started();
        *self = Self::default();
        was_started
    }

    /// Start (`iterations > 0`) or stop (`iterations == 0`) the effect.
    ///
    /// Restarting a started effect re-arms it from `now` without changing
    /// the active count.
    pub fn play(&mut self, now: u64, iterations: u32) -> ActiveDelta {
        if iterations > 0 {
            let delta = if self.is_started() {
                self.flags = EffectFlags::empty();
                ActiveDelta::Unchanged
            } else {
                ActiveDelta::Added
            };
            self.flags.insert(EffectFlags::STARTED);
            self.start_at = now;
            self.count = iterations;
            delta
        } else if self.stop() {
            ActiveDelta::Removed
        } else {
            ActiveDelta::Unchanged
        }
    }

    /// Replace the effect definition.
    ///
    /// A started effect keeps playing with the new parameters, timed from
    /// `now`. Its kind cannot change while started.
    pub fn upload(&mut self, effect: &HapticEffect, now: u64) -> Result<(), EffectError> {
        effect.validate()?;

        if self.is_started() && effect.kind() != self.effect.kind() {
            return Err(EffectError::TypeChanged {
                from: self.effect.kind().name(),
                to: effect.kind().name(),
            });
        }

        self.effect = *effect;

        if self.is_started() {
            self.flags.insert(EffectFlags::UPDATING);
            self.updated_at = now;
        }
        Ok(())
    }

    /// Clear every flag. Returns `true` if the effect was started.
    pub fn stop(&mut self) -> bool {
        let was_started = self.is_started();
        self.flags = EffectFlags::empty();
        was_started
    }

    /// End the current iteration if its stop time has passed.
    pub fn expire(&mut self, now: u64) -> Expiry {
        if !self.flags.contains(EffectFlags::ALLSET)
            || self.length() == 0
            || now < self.stop_at
        {
            return Expiry::Running;
        }

        self.flags = EffectFlags::empty();
        self.count = self.count.saturating_sub(1);
        if self.count == 0 {
            return Expiry::Finished;
        }
        self.flags.insert(EffectFlags::STARTED);
        self.start_at = self.stop_at;
        Expiry::Repeating
    }

    /// Recompute timing, playing state and phase for `now`.
    pub fn advance(&mut self, now: u64) {
        let delay = u64::from(self.effect.replay().delay);
        let length = u64::from(self.length());
        let gain = projection_gain(self.effect.direction().to_device_angle());

        if !self.flags.contains(EffectFlags::ALLSET) {
            self.play_at = self.start_at + delay;
            if !self.flags.contains(EffectFlags::UPDATING) {
                self.updated_at = self.play_at;
            }
            self.direction_gain = gain;
            if let HapticEffect::Periodic(p) = &self.effect {
                self.phase_adj = u32::from(p.phase) * 360 / u32::from(p.period.max(1));
            }
            if length != 0 {
                self.stop_at = self.play_at + length;
            }
            self.flags.insert(EffectFlags::ALLSET);
        }

        if self.flags.contains(EffectFlags::UPDATING) {
            self.flags.remove(EffectFlags::PLAYING);
            self.play_at = self.updated_at + delay;
            self.direction_gain = gain;
            if length != 0 {
                self.stop_at = self.updated_at + length;
            }
            if matches!(self.effect, HapticEffect::Periodic(_)) {
                self.phase_adj = self.phase;
            }
            self.flags.remove(EffectFlags::UPDATING);
        }

        self.slope = ramp_slope(&self.effect);

        if !self.is_playing() && now >= self.play_at && (length == 0 || now < self.stop_at) {
            self.flags.insert(EffectFlags::PLAYING);
        }

        if self.is_playing() {
            self.time_playing = now.saturating_sub(self.play_at);
            if let HapticEffect::Periodic(p) = &self.effect {
                let period = u64::from(p.period.max(1));
                let phase_time = now.saturating_sub(self.updated_at);
                let base = (phase_time % period) * 360 / period;
                let phase = (base + u64::from(self.phase_adj)) % 360;
                self.phase = u32::try_from(phase).unwrap_or(0);
            }
        }
    }

    pub fn effect(&self) -> &HapticEffect {
        &self.effect
    }

    pub fn flags(&self) -> EffectFlags {
        self.flags
    }

    pub fn is_allocated(&self) -> bool {
        self.allocated
    }

    pub fn is_started(&self) -> bool {
        self.flags.contains(EffectFlags::STARTED)
    }

    pub fn is_playing(&self) -> bool {
        self.flags.contains(EffectFlags::PLAYING)
    }

    /// Milliseconds since the play window opened.
    pub fn time_playing(&self) -> u64 {
        self.time_playing
    }

    /// Current waveform phase in degrees, `[0, 360)`.
    pub fn phase(&self) -> u32 {
        self.phase
    }

    pub fn direction_gain(&self) -> f64 {
        self.direction_gain
    }

    /// Ramp slope in level units per millisecond, 16.16 fixed point.
    pub fn slope(&self) -> i64 {
        self.slope
    }

    /// Iterations left, including the current one.
    pub fn remaining_iterations(&self) -> u32 {
        self.count
    }

    pub fn play_at(&self) -> u64 {
        self.play_at
    }

    pub fn stop_at(&self) -> u64 {
        self.stop_at
    }

    fn length(&self) -> u32 {
        self.effect.replay().effective_length()
    }
}

fn ramp_slope(effect: &HapticEffect) -> i64 {
    let HapticEffect::Ramp(ramp) = effect else {
        return 0;
    };
    let length = i64::from(ramp.replay.effective_length());
    let window = length
        - i64::from(ramp.envelope.attack_length)
        - i64::from(ramp.envelope.fade_length);
    if length == 0 || window == 0 {
        return 0;
    }
    ((i64::from(ramp.end) - i64::from(ramp.start)) << 16) / window
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{ConstantEffect, PeriodicEffect, RampEffect, Waveform};

    fn constant(length: u32, delay: u16) -> HapticEffect {
        HapticEffect::from(ConstantEffect::new(1000))
            .with_length(length)
            .with_delay(delay)
    }

    #[test]
    fn test_play_then_stop_nets_zero() -> Result<(), Box<dyn std::error::Error>> {
        let mut state = EffectState::default();
        state.allocate(&constant(0, 0), 0)?;
        assert_eq!(state.play(10, 1), ActiveDelta::Added);
        assert_eq!(state.play(10, 0), ActiveDelta::Removed);
        assert_eq!(state.play(10, 0), ActiveDelta::Unchanged);
        assert!(!state.is_started());
        Ok(())
    }

    #[test]
    fn test_restart_keeps_active_count() -> Result<(), Box<dyn std::error::Error>> {
        let mut state = EffectState::default();
        state.allocate(&constant(0, 0), 0)?;
        assert_eq!(state.play(0, 1), ActiveDelta::Added);
        state.advance(5);
        assert!(state.is_playing());
        assert_eq!(state.play(20, 3), ActiveDelta::Unchanged);
        assert_eq!(state.flags(), EffectFlags::STARTED);
        assert_eq!(state.remaining_iterations(), 3);
        Ok(())
    }

    #[test]
    fn test_delay_defers_playing() -> Result<(), Box<dyn std::error::Error>> {
        let mut state = EffectState::default();
        state.allocate(&constant(100, 50), 0)?;
        state.play(0, 1);
        state.advance(10);
        assert!(!state.is_playing());
        state.advance(50);
        assert!(state.is_playing());
        assert_eq!(state.time_playing(), 0);
        assert_eq!(state.stop_at(), 150);
        Ok(())
    }

    #[test]
    fn test_iterations_repeat_then_finish() -> Result<(), Box<dyn std::error::Error>> {
        let mut state = EffectState::default();
        state.allocate(&constant(100, 0), 0)?;
        state.play(0, 2);
        state.advance(0);
        assert_eq!(state.expire(99), Expiry::Running);
        assert_eq!(state.expire(100), Expiry::Repeating);
        assert!(state.is_started());
        state.advance(100);
        assert!(state.is_playing());
        assert_eq!(state.stop_at(), 200);
        assert_eq!(state.expire(200), Expiry::Finished);
        assert!(!state.is_started());
        assert!(state.is_allocated());
        Ok(())
    }

    #[test]
    fn test_infinite_never_expires() -> Result<(), Box<dyn std::error::Error>> {
        let mut state = EffectState::default();
        state.allocate(&constant(crate::HAPTIC_INFINITY, 0), 0)?;
        state.play(0, 1);
        state.advance(0);
        assert_eq!(state.expire(u64::from(u32::MAX) + 10), Expiry::Running);
        Ok(())
    }

    #[test]
    fn test_kind_change_while_started_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let mut state = EffectState::default();
        state.allocate(&constant(0, 0), 0)?;
        let ramp = HapticEffect::from(RampEffect::new(0, 100));

        state.play(0, 1);
        let err = state.upload(&ramp, 1);
        assert!(matches!(err, Err(EffectError::TypeChanged { from: "constant", to: "ramp" })));

        state.play(2, 0);
        state.upload(&ramp, 3)?;
        assert_eq!(state.effect(), &ramp);
        Ok(())
    }

    #[test]
    fn test_live_update_reschedules() -> Result<(), Box<dyn std::error::Error>> {
        let mut state = EffectState::default();
        state.allocate(&constant(100, 0), 0)?;
        state.play(0, 1);
        state.advance(40);
        state.upload(&constant(100, 0), 40)?;
        assert!(state.flags().contains(EffectFlags::UPDATING));
        state.advance(41);
        assert!(!state.flags().contains(EffectFlags::UPDATING));
        assert_eq!(state.play_at(), 40);
        assert_eq!(state.stop_at(), 140);
        assert_eq!(state.time_playing(), 1);
        Ok(())
    }

    #[test]
    fn test_phase_wraps_within_a_turn() -> Result<(), Box<dyn std::error::Error>> {
        let mut wave = PeriodicEffect::new(Waveform::Triangle, 360, 1000);
        wave.phase = 270;
        let mut state = EffectState::default();
        state.allocate(&wave.into(), 0)?;
        state.play(0, 1);
        state.advance(180);
        assert_eq!(state.phase(), (180 + 270) % 360);
        Ok(())
    }

    #[test]
    fn test_ramp_slope() -> Result<(), Box<dyn std::error::Error>> {
        let mut state = EffectState::default();
        state.allocate(&HapticEffect::from(RampEffect::new(0, 1000)).with_length(1000), 0)?;
        state.play(0, 1);
        state.advance(0);
        assert_eq!(state.slope(), (1000 << 16) / 1000);
        Ok(())
    }

    #[test]
    fn test_release_reports_active() -> Result<(), Box<dyn std::error::Error>> {
        let mut state = EffectState::default();
        state.allocate(&constant(0, 0), 0)?;
        state.play(0, 1);
        assert!(state.release());
        assert!(!state.is_allocated());
        assert!(!state.release());
        Ok(())
    }
}
