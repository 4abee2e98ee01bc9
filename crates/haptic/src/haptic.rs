//! Generic haptic handle.
//!
//! [`Haptic`] checks every call the way the generic haptic layer does
//! (supported feature, effect id range, type changes, value ranges) before
//! handing it to the driver's [`HapticDevice`]. It also keeps a copy of each
//! uploaded effect and the message of the last failed call.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use hidhaptic_driver::{EffectId, EffectStatus, HapticDevice};
use hidhaptic_effects::{HapticEffect, HapticFeatures, MAX_PERCENT};
use hidhaptic_errors::{DeviceError, EffectError, HapticError, Result};
use hidhaptic_hid_common::JoystickTransport;
use parking_lot::Mutex;
use tracing::debug;

use crate::config::HapticConfig;

/// Identifier of an open haptic device, unique within its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HapticId(pub(crate) u32);

impl HapticId {
    pub fn value(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for HapticId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "haptic#{}", self.0)
    }
}

#[derive(Debug, Default)]
pub(crate) struct HandleState {
    pub(crate) effects: Vec<Option<HapticEffect>>,
    pub(crate) rumble: Option<Rumble>,
    last_error: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Rumble {
    pub(crate) id: EffectId,
    pub(crate) effect: HapticEffect,
}

/// A driver device registered with a [`crate::HapticRegistry`].
pub struct OpenDevice {
    id: HapticId,
    driver: &'static str,
    name: String,
    joystick: Arc<dyn JoystickTransport>,
    device: Box<dyn HapticDevice>,
    features: HapticFeatures,
    num_effects: usize,
    pub(crate) state: Mutex<HandleState>,
    pub(crate) refs: AtomicUsize,
    closed: AtomicBool,
}

impl OpenDevice {
    pub(crate) fn new(
        id: HapticId,
        driver: &'static str,
        joystick: Arc<dyn JoystickTransport>,
        device: Box<dyn HapticDevice>,
    ) -> Self {
        let num_effects = device.num_effects();
        Self {
            id,
            driver,
            name: joystick.info().display_name(),
            features: device.features(),
            num_effects,
            state: Mutex::new(HandleState {
                effects: vec![None; num_effects],
                ..HandleState::default()
            }),
            joystick,
            device,
            refs: AtomicUsize::new(1),
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> HapticId {
        self.id
    }

    pub fn joystick(&self) -> &Arc<dyn JoystickTransport> {
        &self.joystick
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn features(&self) -> HapticFeatures {
        self.features
    }

    pub(crate) fn driver_device(&self) -> &dyn HapticDevice {
        self.device.as_ref()
    }

    /// Close the driver device once.
    ///
    /// Runs under the handle lock so no call is half way through the driver
    /// when its update thread goes away.
    pub(crate) fn close(&self) {
        let _state = self.state.lock();
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.device.close();
        debug!(haptic = %self.id, driver = self.driver, "Closed haptic device");
    }
}

impl std::fmt::Debug for OpenDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenDevice")
            .field("id", &self.id)
            .field("driver", &self.driver)
            .field("name", &self.name)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// Handle to an open haptic device.
///
/// Handles are cheap to clone; clones share the device and its effects.
/// Every clone of one open counts as that open, so the open is released by
/// the first [`crate::HapticRegistry::close`] of any of them.
#[derive(Debug, Clone)]
pub struct Haptic {
    pub(crate) device: Arc<OpenDevice>,
    released: Arc<AtomicBool>,
    config: HapticConfig,
}

impl Haptic {
    pub(crate) fn new(device: Arc<OpenDevice>, config: HapticConfig) -> Self {
        Self {
            device,
            released: Arc::new(AtomicBool::new(false)),
            config,
        }
    }

    /// Mark this open as released. Returns `false` if it already was.
    pub(crate) fn release(&self) -> bool {
        !self.released.swap(true, Ordering::AcqRel)
    }

    pub fn id(&self) -> HapticId {
        self.device.id
    }

    /// Product name of the underlying joystick.
    pub fn name(&self) -> &str {
        &self.device.name
    }

    pub fn driver_name(&self) -> &'static str {
        self.device.driver
    }

    pub fn joystick(&self) -> &Arc<dyn JoystickTransport> {
        &self.device.joystick
    }

    pub fn num_effects(&self) -> usize {
        self.device.num_effects
    }

    pub fn num_effects_playing(&self) -> usize {
        self.device.device.num_effects_playing()
    }

    pub fn features(&self) -> HapticFeatures {
        self.device.features
    }

    pub fn num_axes(&self) -> usize {
        self.device.device.num_axes()
    }

    pub fn effect_supported(&self, effect: &HapticEffect) -> bool {
        self.device.features.contains(effect.kind().feature())
    }

    /// Message of the last failed call on this device.
    pub fn last_error(&self) -> Option<String> {
        self.device.state.lock().last_error.clone()
    }

    pub fn clear_error(&self) {
        self.device.state.lock().last_error = None;
    }

    /// Upload a new effect and return its id.
    ///
    /// # Errors
    ///
    /// Fails with [`EffectError::UnsupportedEffect`] when the device lacks
    /// the effect's feature, and with whatever the driver reports otherwise.
    pub fn new_effect(&self, effect: &HapticEffect) -> Result<EffectId> {
        self.with_state(|device, state| create(device, state, effect))
    }

    /// Replace an effect's parameters. The effect kind cannot change.
    pub fn update_effect(&self, id: EffectId, effect: &HapticEffect) -> Result<()> {
        self.with_state(|device, state| update(device, state, id, effect))
    }

    /// Play an effect `iterations` times.
    pub fn run_effect(&self, id: EffectId, iterations: u32) -> Result<()> {
        self.with_state(|device, _| {
            device.check_id(id)?;
            device.device.run_effect(id, iterations)
        })
    }

    pub fn stop_effect(&self, id: EffectId) -> Result<()> {
        self.with_state(|device, _| {
            device.check_id(id)?;
            device.device.stop_effect(id)
        })
    }

    /// Free an effect. Destroying an unallocated id in range does nothing.
    pub fn destroy_effect(&self, id: EffectId) -> Result<()> {
        self.with_state(|device, state| destroy(device, state, id))
    }

    pub fn effect_status(&self, id: EffectId) -> Result<EffectStatus> {
        self.with_state(|device, _| {
            device.check_id(id)?;
            device.require(HapticFeatures::STATUS, "status")?;
            device.device.effect_status(id)
        })
    }

    /// Set the application gain in percent.
    ///
    /// The value is scaled by the configured gain ceiling before it reaches
    /// the driver.
    pub fn set_gain(&self, gain: i32) -> Result<()> {
        let config = self.config;
        self.with_state(|device, _| {
            device.require(HapticFeatures::GAIN, "gain")?;
            check_percent("gain", gain)?;
            device.device.set_gain(config.scale_gain(gain))
        })
    }

    /// Set the autocenter strength in percent, 0 disables it.
    pub fn set_autocenter(&self, autocenter: i32) -> Result<()> {
        self.with_state(|device, _| {
            device.require(HapticFeatures::AUTOCENTER, "autocenter")?;
            check_percent("autocenter", autocenter)?;
            device.device.set_autocenter(autocenter)
        })
    }

    pub fn pause(&self) -> Result<()> {
        self.with_state(|device, _| {
            device.require(HapticFeatures::PAUSE, "pause")?;
            device.device.pause()
        })
    }

    /// Resume a paused device. Devices that cannot pause are never paused,
    /// so this succeeds for them.
    pub fn resume(&self) -> Result<()> {
        self.with_state(|device, _| {
            if !device.features.contains(HapticFeatures::PAUSE) {
                return Ok(());
            }
            device.device.resume()
        })
    }

    /// Stop every effect at once.
    pub fn stop_all(&self) -> Result<()> {
        self.with_state(|device, _| device.device.stop_all())
    }

    /// Run `op` under the handle lock and remember its error message.
    pub(crate) fn with_state<T>(
        &self,
        op: impl FnOnce(&OpenDevice, &mut HandleState) -> Result<T>,
    ) -> Result<T> {
        let device = self.device.as_ref();
        let mut state = device.state.lock();
        let result = if device.is_closed() {
            Err(DeviceError::Closed {
                device: device.id.to_string(),
            }
            .into())
        } else {
            op(device, &mut state)
        };

        if let Err(e) = &result {
            debug!(haptic = %device.id, error = %e, "Haptic call failed");
            state.last_error = Some(e.to_string());
        }
        result
    }
}

impl OpenDevice {
    fn check_id(&self, id: EffectId) -> Result<usize> {
        id.index(self.num_effects)
            .ok_or_else(|| EffectError::BadEffectId { id: id.value() }.into())
    }

    fn require(&self, feature: HapticFeatures, name: &'static str) -> Result<()> {
        if self.features.contains(feature) {
            Ok(())
        } else {
            Err(HapticError::unsupported(name))
        }
    }
}

fn check_percent(field: &'static str, value: i32) -> Result<()> {
    if (0..=MAX_PERCENT).contains(&value) {
        Ok(())
    } else {
        Err(EffectError::invalid_parameter(field, "must be between 0 and 100").into())
    }
}

pub(crate) fn create(
    device: &OpenDevice,
    state: &mut HandleState,
    effect: &HapticEffect,
) -> Result<EffectId> {
    let kind = effect.kind();
    if !device.features.contains(kind.feature()) {
        return Err(EffectError::UnsupportedEffect { kind: kind.name() }.into());
    }

    let id = device.device.new_effect(effect)?;
    if let Some(slot) = id.index(state.effects.len()) {
        state.effects[slot] = Some(*effect);
    }
    Ok(id)
}

pub(crate) fn update(
    device: &OpenDevice,
    state: &mut HandleState,
    id: EffectId,
    effect: &HapticEffect,
) -> Result<()> {
    let slot = device.check_id(id)?;
    if let Some(current) = &state.effects[slot] {
        if current.kind() != effect.kind() {
            return Err(EffectError::TypeChanged {
                from: current.kind().name(),
                to: effect.kind().name(),
            }
            .into());
        }
    }

    device.device.update_effect(id, effect)?;
    state.effects[slot] = Some(*effect);
    Ok(())
}

fn destroy(device: &OpenDevice, state: &mut HandleState, id: EffectId) -> Result<()> {
    let slot = device.check_id(id)?;
    if state.effects[slot].is_none() {
        return Ok(());
    }

    device.device.destroy_effect(id)?;
    state.effects[slot] = None;
    if state.rumble.is_some_and(|r| r.id == id) {
        state.rumble = None;
    }
    Ok(())
}
