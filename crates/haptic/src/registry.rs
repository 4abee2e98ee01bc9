//! HIDAPI haptic driver registry.
//!
//! The registry routes a joystick to the first registered driver that
//! supports it and tracks the devices opened through it. One mutex guards
//! both lists. It is never held while a driver opens or closes a device, so
//! it never nests inside a device lock.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use hidhaptic_driver::HapticDriver;
use hidhaptic_effects::HapticFeatures;
use hidhaptic_errors::{DeviceError, Result};
use hidhaptic_hid_common::JoystickTransport;
use hidhaptic_lg4ff::Lg4ffDriver;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::HapticConfig;
use crate::haptic::{Haptic, HapticId, OpenDevice};

#[derive(Default)]
struct RegistryInner {
    drivers: Vec<Arc<dyn HapticDriver>>,
    devices: HashMap<HapticId, Arc<OpenDevice>>,
    next_id: u32,
}

impl RegistryInner {
    fn find_driver(&self, joystick: &dyn JoystickTransport) -> Option<Arc<dyn HapticDriver>> {
        self.drivers
            .iter()
            .find(|d| d.joystick_supported(joystick))
            .cloned()
    }

    fn find_open(&self, joystick: &Arc<dyn JoystickTransport>) -> Option<Arc<OpenDevice>> {
        self.devices
            .values()
            .find(|d| Arc::ptr_eq(d.joystick(), joystick))
            .cloned()
    }
}

/// Registered haptic drivers and the devices opened through them.
///
/// # Examples
///
/// ```
/// use hidhaptic::HapticRegistry;
/// use hidhaptic_hid_common::mock::MockJoystick;
///
/// let registry = HapticRegistry::with_default_drivers();
/// assert!(registry.joystick_is_haptic(&MockJoystick::new(0x046d, 0xc24f)));
/// assert!(!registry.joystick_is_haptic(&MockJoystick::new(0x046d, 0xc24f).non_hidapi()));
/// assert!(!registry.joystick_is_haptic(&MockJoystick::new(0x1234, 0x5678)));
/// ```
pub struct HapticRegistry {
    inner: Mutex<RegistryInner>,
    config: HapticConfig,
}

impl HapticRegistry {
    /// An empty registry configured from the environment.
    pub fn new() -> Self {
        Self::with_config(HapticConfig::from_env())
    }

    pub fn with_config(config: HapticConfig) -> Self {
        Self {
            inner: Mutex::new(RegistryInner::default()),
            config,
        }
    }

    /// A registry with every built-in driver registered.
    pub fn with_default_drivers() -> Self {
        let registry = Self::new();
        registry.register_driver(Arc::new(Lg4ffDriver::new()));
        registry
    }

    /// Add a driver. Drivers are consulted in registration order.
    pub fn register_driver(&self, driver: Arc<dyn HapticDriver>) {
        debug!(driver = driver.name(), "Registered haptic driver");
        self.inner.lock().drivers.push(driver);
    }

    pub fn driver_names(&self) -> Vec<&'static str> {
        self.inner.lock().drivers.iter().map(|d| d.name()).collect()
    }

    /// `true` if `joystick` is driven over HIDAPI and a driver supports it.
    pub fn joystick_is_haptic(&self, joystick: &dyn JoystickTransport) -> bool {
        joystick.is_hidapi() && self.inner.lock().find_driver(joystick).is_some()
    }

    /// Open the haptic device behind `joystick`.
    ///
    /// Opening a joystick that is already open returns another handle to the
    /// same device. A freshly opened device gets full gain and autocenter
    /// off.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::NotHidapi`] for joysticks on another
    /// transport, [`DeviceError::NoDriver`] when no driver supports the
    /// joystick, and the driver's error when opening fails.
    pub fn open_from_joystick(&self, joystick: Arc<dyn JoystickTransport>) -> Result<Haptic> {
        if !joystick.is_hidapi() {
            return Err(DeviceError::NotHidapi.into());
        }

        let driver = {
            let inner = self.inner.lock();
            if let Some(device) = inner.find_open(&joystick) {
                device.refs.fetch_add(1, Ordering::AcqRel);
                return Ok(Haptic::new(device, self.config));
            }
            inner
                .find_driver(joystick.as_ref())
                .ok_or(DeviceError::NoDriver)?
        };

        let device = driver.open(Arc::clone(&joystick))?;

        let opened = {
            let mut inner = self.inner.lock();
            if let Some(existing) = inner.find_open(&joystick) {
                existing.refs.fetch_add(1, Ordering::AcqRel);
                Err((existing, device))
            } else {
                let id = HapticId(inner.next_id);
                inner.next_id = inner.next_id.wrapping_add(1);
                let open = Arc::new(OpenDevice::new(id, driver.name(), joystick, device));
                inner.devices.insert(id, Arc::clone(&open));
                Ok(open)
            }
        };

        let device = match opened {
            Ok(device) => device,
            Err((existing, raced)) => {
                // Another thread opened the same joystick first.
                raced.close();
                return Ok(Haptic::new(existing, self.config));
            }
        };

        info!(
            haptic = %device.id(),
            driver = driver.name(),
            device = %device.joystick().info().id_string(),
            "Opened haptic device"
        );

        let haptic = Haptic::new(device, self.config);
        if haptic.features().contains(HapticFeatures::GAIN) {
            if let Err(e) = haptic.set_gain(100) {
                warn!(haptic = %haptic.id(), error = %e, "Failed setting initial gain");
            }
        }
        if haptic.features().contains(HapticFeatures::AUTOCENTER) {
            if let Err(e) = haptic.set_autocenter(0) {
                warn!(haptic = %haptic.id(), error = %e, "Failed disabling autocenter");
            }
        }
        Ok(haptic)
    }

    /// `true` if `haptic` is a live device of this registry.
    pub fn is_hidapi(&self, haptic: &Haptic) -> bool {
        self.inner
            .lock()
            .devices
            .get(&haptic.id())
            .is_some_and(|d| Arc::ptr_eq(d, &haptic.device))
    }

    /// `true` if `haptic` was opened from `joystick`.
    pub fn same_haptic(&self, haptic: &Haptic, joystick: &Arc<dyn JoystickTransport>) -> bool {
        joystick.is_hidapi() && Arc::ptr_eq(haptic.joystick(), joystick)
    }

    /// Release a handle. The device closes with its last open.
    ///
    /// Closing a clone of an already released handle does nothing.
    pub fn close(&self, haptic: Haptic) {
        if !haptic.release() {
            debug!(haptic = %haptic.id(), "Handle already released");
            return;
        }

        let removed = {
            let mut inner = self.inner.lock();
            let id = haptic.id();
            let live = inner
                .devices
                .get(&id)
                .is_some_and(|d| Arc::ptr_eq(d, &haptic.device));
            if live && haptic.device.refs.fetch_sub(1, Ordering::AcqRel) == 1 {
                inner.devices.remove(&id)
            } else {
                None
            }
        };

        if let Some(device) = removed {
            device.close();
            info!(haptic = %device.id(), "Released haptic device");
        }
    }

    /// Close every open device.
    pub fn quit(&self) {
        let devices: Vec<_> = {
            let mut inner = self.inner.lock();
            inner.devices.drain().map(|(_, d)| d).collect()
        };
        for device in devices {
            device.close();
        }
    }

    /// Number of open devices.
    pub fn num_open(&self) -> usize {
        self.inner.lock().devices.len()
    }
}

impl Default for HapticRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for HapticRegistry {
    fn drop(&mut self) {
        self.quit();
    }
}

impl std::fmt::Debug for HapticRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("HapticRegistry")
            .field("drivers", &inner.drivers.iter().map(|d| d.name()).collect::<Vec<_>>())
            .field("devices", &inner.devices.len())
            .field("config", &self.config)
            .finish()
    }
}
