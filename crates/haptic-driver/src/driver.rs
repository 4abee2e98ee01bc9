//! Driver and device traits.

use std::sync::Arc;

use hidhaptic_effects::{HapticEffect, HapticFeatures};
use hidhaptic_errors::{DeviceError, Result};
use hidhaptic_hid_common::JoystickTransport;

use crate::types::{EffectId, EffectStatus};

/// A haptic backend for a family of HIDAPI joysticks.
pub trait HapticDriver: Send + Sync {
    /// Short driver name used in logs.
    fn name(&self) -> &'static str;

    /// `true` if this driver can render force feedback on `joystick`.
    fn joystick_supported(&self, joystick: &dyn JoystickTransport) -> bool;

    /// Initialize the device and start driving it.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::UnsupportedDevice`] for joysticks the driver
    /// does not handle and an initialization error when the device rejects
    /// its setup commands.
    fn open(&self, joystick: Arc<dyn JoystickTransport>) -> Result<Box<dyn HapticDevice>>;
}

/// An opened haptic device.
///
/// Every method takes `&self`; implementations serialize access internally
/// so a device can be shared between threads.
pub trait HapticDevice: Send + Sync {
    /// Name of the driver that opened the device.
    fn driver_name(&self) -> &'static str;

    /// Capacity of the effect table.
    fn num_effects(&self) -> usize;

    /// Number of effects that can play at once.
    fn num_effects_playing(&self) -> usize;

    fn features(&self) -> HapticFeatures;

    fn num_axes(&self) -> usize;

    fn effect_supported(&self, effect: &HapticEffect) -> bool {
        self.features().contains(effect.kind().feature())
    }

    /// Upload a new effect.
    ///
    /// # Errors
    ///
    /// Fails when the kind is unsupported, the table is full or the
    /// parameters are invalid. No slot is consumed on failure.
    fn new_effect(&self, effect: &HapticEffect) -> Result<EffectId>;

    /// Replace the parameters of an uploaded effect, live if it is playing.
    ///
    /// # Errors
    ///
    /// Fails on a bad id, invalid parameters or a kind change while started.
    fn update_effect(&self, id: EffectId, effect: &HapticEffect) -> Result<()>;

    /// Start an effect for `iterations` runs, or stop it when zero.
    ///
    /// # Errors
    ///
    /// Fails on a bad id.
    fn run_effect(&self, id: EffectId, iterations: u32) -> Result<()>;

    /// Stop an effect. Stopping a stopped effect does nothing.
    ///
    /// # Errors
    ///
    /// Fails on a bad id.
    fn stop_effect(&self, id: EffectId) -> Result<()> {
        self.run_effect(id, 0)
    }

    /// Stop an effect and free its slot.
    ///
    /// # Errors
    ///
    /// Fails on a bad id.
    fn destroy_effect(&self, id: EffectId) -> Result<()>;

    /// # Errors
    ///
    /// Fails on a bad id.
    fn effect_status(&self, id: EffectId) -> Result<EffectStatus>;

    /// Set the application gain in percent.
    ///
    /// # Errors
    ///
    /// Fails when the device is unavailable.
    fn set_gain(&self, gain: i32) -> Result<()>;

    /// Set the autocenter strength in percent.
    ///
    /// # Errors
    ///
    /// Fails when the command cannot be written.
    fn set_autocenter(&self, autocenter: i32) -> Result<()>;

    /// # Errors
    ///
    /// Devices without pause support return [`DeviceError::Unsupported`].
    fn pause(&self) -> Result<()> {
        Err(DeviceError::Unsupported { feature: "pause" }.into())
    }

    /// # Errors
    ///
    /// Devices without pause support return [`DeviceError::Unsupported`].
    fn resume(&self) -> Result<()> {
        Err(DeviceError::Unsupported { feature: "resume" }.into())
    }

    /// Stop every effect.
    ///
    /// # Errors
    ///
    /// Fails when the device is unavailable.
    fn stop_all(&self) -> Result<()>;

    /// Stop all effects and release the device. Later calls do nothing.
    fn close(&self);
}
