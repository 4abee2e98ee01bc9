//! lg4ff effect renderer.
//!
//! [`RendererState`] owns the effect table and the four hardware slots of
//! one wheel. It performs no I/O: every tick returns the slot commands that
//! changed, and the caller transmits them. The device wraps it in a mutex
//! and drives [`RendererState::tick`] from its background thread.

use hidhaptic_driver::EffectId;
use hidhaptic_effects::{
    ActiveDelta, ConditionKind, ConditionParameters, EffectOutput, EffectState, Expiry, HapticEffect,
    HapticFeatures, MAX_PERCENT, calculate_force,
};
use hidhaptic_errors::EffectError;
use hidhaptic_logitech_protocol::{
    LogitechModel, REPORT_LEN, SLOT_COUNT, Slot, SlotKind, SlotParameters, build_fixed_loop_report,
};

/// Capacity of the effect table.
pub const MAX_EFFECTS: usize = 16;

/// Consecutive failing ticks after which the device counts as lost.
pub const DEVICE_LOST_THRESHOLD: u32 = 250;

/// Full-scale gain.
const GAIN_MAX: u32 = 0xffff;

/// Features of every lg4ff wheel.
pub const LG4FF_FEATURES: HapticFeatures = HapticFeatures::CONSTANT
    .union(HapticFeatures::SPRING)
    .union(HapticFeatures::DAMPER)
    .union(HapticFeatures::AUTOCENTER)
    .union(HapticFeatures::SINE)
    .union(HapticFeatures::SQUARE)
    .union(HapticFeatures::TRIANGLE)
    .union(HapticFeatures::SAWTOOTHUP)
    .union(HapticFeatures::SAWTOOTHDOWN)
    .union(HapticFeatures::RAMP)
    .union(HapticFeatures::FRICTION)
    .union(HapticFeatures::STATUS)
    .union(HapticFeatures::GAIN);

/// A slot command produced by a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotCommand {
    pub slot: SlotKind,
    pub report: [u8; REPORT_LEN],
}

/// Change in transport health after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    Healthy,
    /// First failing tick of a streak.
    FirstFailure,
    StillFailing,
    /// The streak reached [`DEVICE_LOST_THRESHOLD`].
    Lost,
    /// A tick succeeded after a failure streak.
    Recovered,
}

/// Effect table, slots and gains of one lg4ff wheel.
#[derive(Debug, Clone)]
pub struct RendererState {
    model: LogitechModel,
    states: [EffectState; MAX_EFFECTS],
    slots: [Slot; SLOT_COUNT],
    effects_used: usize,
    gain: u16,
    app_gain: u16,
    spring_level: u8,
    damper_level: u8,
    friction_level: u8,
    peak_ffb_level: i64,
    failure_streak: u32,
    write_failures: u64,
    lost: bool,
}

impl RendererState {
    pub fn new(model: LogitechModel, config: &crate::Lg4ffConfig) -> Self {
        Self {
            model,
            states: std::array::from_fn(|_| EffectState::default()),
            slots: SlotKind::ALL.map(Slot::new),
            effects_used: 0,
            gain: config.gain,
            app_gain: u16::MAX,
            spring_level: config.spring_level,
            damper_level: config.damper_level,
            friction_level: config.friction_level,
            peak_ffb_level: 0,
            failure_streak: 0,
            write_failures: 0,
            lost: false,
        }
    }

    /// Reset the table and slots, returning the setup reports in order:
    /// fixed-loop off, then one disable per slot.
    pub fn init_slots(&mut self) -> Vec<[u8; REPORT_LEN]> {
        self.states = std::array::from_fn(|_| EffectState::default());
        self.slots = SlotKind::ALL.map(Slot::new);
        self.effects_used = 0;

        let mut reports = vec![build_fixed_loop_report(false)];
        let zero = SlotParameters::default();
        for slot in &mut self.slots {
            slot.update(&zero);
            if let Some(report) = slot.take_pending() {
                reports.push(report);
            }
        }
        reports
    }

    /// Upload a new effect into the first free entry.
    pub fn new_effect(&mut self, effect: &HapticEffect, now: u64) -> Result<EffectId, EffectError> {
        let kind = effect.kind();
        if !LG4FF_FEATURES.contains(kind.feature()) {
            return Err(EffectError::UnsupportedEffect { kind: kind.name() });
        }

        let (index, state) = self
            .states
            .iter_mut()
            .enumerate()
            .find(|(_, s)| !s.is_allocated())
            .ok_or(EffectError::SlotExhausted {
                capacity: MAX_EFFECTS,
            })?;

        state.allocate(effect, now)?;
        Ok(EffectId::from(index))
    }

    pub fn update_effect(
        &mut self,
        id: EffectId,
        effect: &HapticEffect,
        now: u64,
    ) -> Result<(), EffectError> {
        let index = self.index(id)?;
        self.states[index].upload(effect, now)
    }

    /// Start an effect for `iterations` runs, or stop it when zero.
    pub fn run_effect(&mut self, id: EffectId, iterations: u32, now: u64) -> Result<(), EffectError> {
        let index = self.index(id)?;
        match self.states[index].play(now, iterations) {
            ActiveDelta::Added => self.effects_used += 1,
            ActiveDelta::Removed => {
                self.effects_used = self.effects_used.saturating_sub(1);
            }
            ActiveDelta::Unchanged => {}
        }
        Ok(())
    }

    pub fn destroy_effect(&mut self, id: EffectId) -> Result<(), EffectError> {
        let index = self.index(id)?;
        if self.states[index].release() {
            self.effects_used = self.effects_used.saturating_sub(1);
        }
        Ok(())
    }

    /// `true` if the effect is started.
    pub fn effect_status(&self, id: EffectId) -> Result<bool, EffectError> {
        let index = self.index(id)?;
        Ok(self.states[index].is_started())
    }

    /// Stop every effect without freeing them.
    pub fn stop_all(&mut self) {
        for state in &mut self.states {
            state.stop();
        }
        self.effects_used = 0;
    }

    /// Set the application gain from a percentage, clamped to `0..=100`.
    pub fn set_app_gain(&mut self, percent: i32) {
        let percent = u32::try_from(percent.clamp(0, MAX_PERCENT)).unwrap_or(0);
        self.app_gain = u16::try_from(GAIN_MAX * percent / 100).unwrap_or(u16::MAX);
    }

    /// Render one tick at `now` and return the slot commands that changed.
    pub fn tick(&mut self, now: u64) -> Vec<SlotCommand> {
        let gain = i64::from(self.composed_gain());
        let mut params = [SlotParameters::default(); SLOT_COUNT];
        let mut level: i64 = 0;
        let mut force_active = false;

        let mut remaining = self.effects_used;
        for state in &mut self.states {
            if remaining == 0 {
                break;
            }
            if !state.is_started() {
                continue;
            }
            remaining -= 1;

            if state.expire(now) == Expiry::Finished {
                self.effects_used = self.effects_used.saturating_sub(1);
                continue;
            }
            state.advance(now);

            match calculate_force(state) {
                Some(EffectOutput::Force(force)) => {
                    level += i64::from(force);
                    force_active = true;
                }
                Some(EffectOutput::Condition(kind, condition)) => {
                    if let Some(slot) = condition_slot(kind) {
                        params[slot.index()] = slot_parameters(&condition);
                    }
                }
                None => {}
            }
        }

        level = level * gain / i64::from(GAIN_MAX);
        params[0].level = i32::try_from(level).unwrap_or(if level < 0 { i32::MIN } else { i32::MAX });
        params[0].clip = u32::from(force_active);

        params[SlotKind::Spring.index()].clip =
            scale_percent(params[SlotKind::Spring.index()].clip, self.spring_level);
        params[SlotKind::Damper.index()].clip =
            scale_percent(params[SlotKind::Damper.index()].clip, self.damper_level);
        params[SlotKind::Friction.index()].clip =
            scale_percent(params[SlotKind::Friction.index()].clip, self.friction_level);

        let mut ffb_level = level.abs();
        for p in params.iter_mut().skip(1) {
            p.k1 = scale_gain(p.k1, gain);
            p.k2 = scale_gain(p.k2, gain);
            p.clip = u32::try_from(i64::from(p.clip) * gain / i64::from(GAIN_MAX)).unwrap_or(0);
            ffb_level += i64::from(p.clip) * 0x7fff / i64::from(GAIN_MAX);
        }
        self.peak_ffb_level = self.peak_ffb_level.max(ffb_level);

        let mut commands = Vec::new();
        for (slot, p) in self.slots.iter_mut().zip(params.iter()) {
            slot.update(p);
            if let Some(report) = slot.take_pending() {
                commands.push(SlotCommand {
                    slot: slot.kind(),
                    report,
                });
            }
        }
        commands
    }

    /// Make the next tick resend `slot` after its transmission failed.
    pub fn requeue(&mut self, slot: SlotKind) {
        self.slots[slot.index()].invalidate();
    }

    /// Record whether all writes of a tick succeeded.
    pub fn record_tick(&mut self, ok: bool) -> LinkEvent {
        if ok {
            let event = if self.failure_streak > 0 {
                LinkEvent::Recovered
            } else {
                LinkEvent::Healthy
            };
            self.failure_streak = 0;
            self.lost = false;
            return event;
        }

        self.write_failures += 1;
        self.failure_streak = self.failure_streak.saturating_add(1);
        if self.failure_streak == 1 {
            LinkEvent::FirstFailure
        } else if self.failure_streak == DEVICE_LOST_THRESHOLD {
            self.lost = true;
            LinkEvent::Lost
        } else {
            LinkEvent::StillFailing
        }
    }

    pub fn model(&self) -> LogitechModel {
        self.model
    }

    /// Number of started effects.
    pub fn effects_used(&self) -> usize {
        self.effects_used
    }

    /// Largest combined force level seen so far.
    pub fn peak_ffb_level(&self) -> i64 {
        self.peak_ffb_level
    }

    /// Ticks whose writes failed, over the device lifetime.
    pub fn write_failures(&self) -> u64 {
        self.write_failures
    }

    pub fn failure_streak(&self) -> u32 {
        self.failure_streak
    }

    pub fn is_lost(&self) -> bool {
        self.lost
    }

    pub fn app_gain(&self) -> u16 {
        self.app_gain
    }

    pub fn slot(&self, kind: SlotKind) -> &Slot {
        &self.slots[kind.index()]
    }

    fn composed_gain(&self) -> u32 {
        u32::from(self.gain) * u32::from(self.app_gain) / GAIN_MAX
    }

    fn index(&self, id: EffectId) -> Result<usize, EffectError> {
        id.index(MAX_EFFECTS)
            .filter(|&i| self.states[i].is_allocated())
            .ok_or(EffectError::BadEffectId { id: id.value() })
    }
}

fn condition_slot(kind: ConditionKind) -> Option<SlotKind> {
    match kind {
        ConditionKind::Spring => Some(SlotKind::Spring),
        ConditionKind::Damper => Some(SlotKind::Damper),
        ConditionKind::Friction => Some(SlotKind::Friction),
        ConditionKind::Inertia => None,
    }
}

fn slot_parameters(condition: &ConditionParameters) -> SlotParameters {
    SlotParameters {
        level: 0,
        d1: condition.d1,
        d2: condition.d2,
        k1: condition.k1,
        k2: condition.k2,
        clip: condition.clip,
    }
}

fn scale_percent(clip: u32, percent: u8) -> u32 {
    clip * u32::from(percent) / 100
}

fn scale_gain(value: i32, gain: i64) -> i32 {
    i32::try_from(i64::from(value) * gain / i64::from(GAIN_MAX)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lg4ffConfig;
    use hidhaptic_effects::{ConditionEffect, ConstantEffect, PeriodicEffect, Waveform};
    use hidhaptic_logitech_protocol::SlotOp;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn renderer() -> RendererState {
        let mut r = RendererState::new(LogitechModel::G29, &Lg4ffConfig::default());
        r.init_slots();
        r
    }

    #[test]
    fn test_init_reports() {
        let mut r = RendererState::new(LogitechModel::G29, &Lg4ffConfig::default());
        let reports = r.init_slots();
        assert_eq!(
            reports,
            vec![
                [0x0d, 0, 0, 0, 0, 0, 0],
                [0x13, 0, 0, 0, 0, 0, 0],
                [0x23, 0, 0, 0, 0, 0, 0],
                [0x43, 0, 0, 0, 0, 0, 0],
                [0x83, 0, 0, 0, 0, 0, 0],
            ]
        );
        assert!(r.tick(0).is_empty());
    }

    #[test]
    fn test_constant_start_and_stop() -> TestResult {
        let mut r = renderer();
        let id = r.new_effect(&ConstantEffect::new(20000).into(), 0)?;
        r.run_effect(id, 1, 0)?;

        let sent = r.tick(1);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].slot, SlotKind::Constant);
        assert_eq!(sent[0].report[0], 0x11);
        assert_ne!(sent[0].report[2], 0);

        assert!(r.tick(2).is_empty());

        r.run_effect(id, 0, 3)?;
        let sent = r.tick(3);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].report, [0x13, 0, 0, 0, 0, 0, 0]);
        Ok(())
    }

    #[test]
    fn test_table_full() -> TestResult {
        let mut r = renderer();
        let effect = ConstantEffect::new(1).into();
        for _ in 0..MAX_EFFECTS {
            r.new_effect(&effect, 0)?;
        }
        assert_eq!(
            r.new_effect(&effect, 0),
            Err(EffectError::SlotExhausted { capacity: MAX_EFFECTS })
        );
        r.destroy_effect(EffectId::new(5))?;
        assert_eq!(r.new_effect(&effect, 0)?, EffectId::new(5));
        Ok(())
    }

    #[test]
    fn test_unsupported_kind_allocates_nothing() {
        let mut r = renderer();
        let inertia = ConditionEffect::new(ConditionKind::Inertia, 100, 100).into();
        assert_eq!(
            r.new_effect(&inertia, 0),
            Err(EffectError::UnsupportedEffect { kind: "inertia" })
        );
        assert_eq!(
            r.effect_status(EffectId::new(0)),
            Err(EffectError::BadEffectId { id: 0 })
        );
    }

    #[test]
    fn test_invalid_periodic_allocates_nothing() {
        let mut r = renderer();
        let bad = PeriodicEffect::new(Waveform::Sine, 0, 100).into();
        assert!(matches!(
            r.new_effect(&bad, 0),
            Err(EffectError::InvalidParameter { field: "period", .. })
        ));
        assert!(r.effect_status(EffectId::new(0)).is_err());
    }

    #[test]
    fn test_bad_ids() {
        let mut r = renderer();
        assert_eq!(
            r.run_effect(EffectId::new(-1), 1, 0),
            Err(EffectError::BadEffectId { id: -1 })
        );
        assert_eq!(
            r.destroy_effect(EffectId::new(16)),
            Err(EffectError::BadEffectId { id: 16 })
        );
    }

    #[test]
    fn test_start_then_immediate_stop_nets_zero() -> TestResult {
        let mut r = renderer();
        let id = r.new_effect(&ConstantEffect::new(100).into(), 0)?;
        r.run_effect(id, 3, 0)?;
        r.run_effect(id, 0, 0)?;
        assert_eq!(r.effects_used(), 0);
        r.run_effect(id, 0, 0)?;
        assert_eq!(r.effects_used(), 0);
        assert!(r.tick(1).is_empty());
        Ok(())
    }

    #[test]
    fn test_finished_effect_leaves_active_set() -> TestResult {
        let mut r = renderer();
        let effect = HapticEffect::from(ConstantEffect::new(8000)).with_length(10);
        let id = r.new_effect(&effect, 0)?;
        r.run_effect(id, 1, 0)?;
        assert_eq!(r.tick(0).len(), 1);
        let sent = r.tick(10);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].report[0], 0x13);
        assert_eq!(r.effects_used(), 0);
        assert!(!r.effect_status(id)?);
        Ok(())
    }

    #[test]
    fn test_spring_uses_intensity_cap() -> TestResult {
        let mut r = RendererState::new(
            LogitechModel::G29,
            &Lg4ffConfig::default().with_spring_level(100),
        );
        r.init_slots();
        let spring = ConditionEffect::new(ConditionKind::Spring, 0x7fff, 0xffff).into();
        let id = r.new_effect(&spring, 0)?;
        r.run_effect(id, 1, 0)?;
        let sent = r.tick(0);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].slot, SlotKind::Spring);
        assert_eq!(sent[0].report, [0x21, 0x0b, 0x80, 0x80, 0xee, 0x00, 0xff]);
        assert_eq!(r.slot(SlotKind::Spring).op(), Some(SlotOp::Set));
        Ok(())
    }

    #[test]
    fn test_gain_halves_force() -> TestResult {
        let force_at = |percent: i32| -> Result<u8, Box<dyn std::error::Error>> {
            let mut r = renderer();
            r.set_app_gain(percent);
            let id = r.new_effect(&ConstantEffect::new(10000).into(), 0)?;
            r.run_effect(id, 1, 0)?;
            let sent = r.tick(0);
            Ok(sent.first().map(|c| c.report[2]).unwrap_or(0x80))
        };
        let full = i32::from(force_at(100)?) - 0x80;
        let half = i32::from(force_at(50)?) - 0x80;
        assert_eq!(full, 39);
        assert_eq!(half, 19);
        Ok(())
    }

    #[test]
    fn test_stop_all_resets_active_count() -> TestResult {
        let mut r = renderer();
        for _ in 0..3 {
            let id = r.new_effect(&ConstantEffect::new(100).into(), 0)?;
            r.run_effect(id, 1, 0)?;
        }
        assert_eq!(r.effects_used(), 3);
        r.stop_all();
        assert_eq!(r.effects_used(), 0);
        assert!(!r.effect_status(EffectId::new(1))?);
        Ok(())
    }

    #[test]
    fn test_link_health_policy() {
        let mut r = renderer();
        assert_eq!(r.record_tick(true), LinkEvent::Healthy);
        assert_eq!(r.record_tick(false), LinkEvent::FirstFailure);
        for _ in 2..DEVICE_LOST_THRESHOLD {
            assert_eq!(r.record_tick(false), LinkEvent::StillFailing);
        }
        assert_eq!(r.record_tick(false), LinkEvent::Lost);
        assert!(r.is_lost());
        assert_eq!(r.record_tick(false), LinkEvent::StillFailing);
        assert_eq!(r.record_tick(true), LinkEvent::Recovered);
        assert!(!r.is_lost());
        assert_eq!(r.write_failures(), u64::from(DEVICE_LOST_THRESHOLD) + 1);
    }

    #[test]
    fn test_requeue_retransmits() -> TestResult {
        let mut r = renderer();
        let id = r.new_effect(&ConstantEffect::new(5000).into(), 0)?;
        r.run_effect(id, 1, 0)?;
        let first = r.tick(0);
        assert_eq!(first.len(), 1);
        r.requeue(SlotKind::Constant);
        let again = r.tick(1);
        assert_eq!(again, first);
        Ok(())
    }

    #[test]
    fn test_peak_tracks_combined_level() -> TestResult {
        let mut r = renderer();
        let id = r.new_effect(&ConstantEffect::new(-12000).into(), 0)?;
        r.run_effect(id, 1, 0)?;
        r.tick(0);
        assert_eq!(r.peak_ffb_level(), 12000);
        r.run_effect(id, 0, 1)?;
        r.tick(1);
        assert_eq!(r.peak_ffb_level(), 12000);
        Ok(())
    }
}
