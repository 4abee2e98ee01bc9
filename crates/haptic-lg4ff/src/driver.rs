//! lg4ff haptic driver entry point.

use std::sync::Arc;

use hidhaptic_driver::{HapticDevice, HapticDriver};
use hidhaptic_errors::Result;
use hidhaptic_hid_common::JoystickTransport;

use crate::clock::{Clock, MonotonicClock};
use crate::config::Lg4ffConfig;
use crate::device::{DRIVER_NAME, Lg4ffDevice, is_supported};

/// Driver for Logitech G29, G27, G25, DFGT, DFP and DF-EX/FF-EX wheels.
///
/// Without an explicit configuration, each open reads the environment.
///
/// # Examples
///
/// ```
/// use hidhaptic_driver::HapticDriver;
/// use hidhaptic_hid_common::mock::MockJoystick;
/// use hidhaptic_lg4ff::Lg4ffDriver;
///
/// let driver = Lg4ffDriver::new();
/// assert!(driver.joystick_supported(&MockJoystick::new(0x046d, 0xc24f)));
/// assert!(!driver.joystick_supported(&MockJoystick::new(0x046d, 0xc000)));
/// ```
#[derive(Clone, Default)]
pub struct Lg4ffDriver {
    config: Option<Lg4ffConfig>,
    clock: Option<Arc<dyn Clock>>,
}

impl Lg4ffDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `config` instead of the environment.
    pub fn with_config(mut self, config: Lg4ffConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Time effects with `clock`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Open `joystick` as a concrete [`Lg4ffDevice`].
    ///
    /// # Errors
    ///
    /// See [`Lg4ffDevice::open_with`].
    pub fn open_device(&self, joystick: Arc<dyn JoystickTransport>) -> Result<Lg4ffDevice> {
        let config = self.config.unwrap_or_else(Lg4ffConfig::from_env);
        let clock = self
            .clock
            .clone()
            .unwrap_or_else(|| Arc::new(MonotonicClock::new()));
        Lg4ffDevice::open_with(joystick, config, clock)
    }
}

impl HapticDriver for Lg4ffDriver {
    fn name(&self) -> &'static str {
        DRIVER_NAME
    }

    fn joystick_supported(&self, joystick: &dyn JoystickTransport) -> bool {
        is_supported(joystick)
    }

    fn open(&self, joystick: Arc<dyn JoystickTransport>) -> Result<Box<dyn HapticDevice>> {
        Ok(Box::new(self.open_device(joystick)?))
    }
}

impl std::fmt::Debug for Lg4ffDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lg4ffDriver")
            .field("config", &self.config)
            .field("clock", &self.clock.is_some())
            .finish()
    }
}
