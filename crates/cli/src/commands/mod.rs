//! Command implementations for haptic-test

pub mod control;
pub mod device;
pub mod effect;

use std::sync::Arc;

use hidapi::HidApi;
use hidhaptic::{Haptic, HapticRegistry};

use crate::error::CliError;
use crate::wheels::{self, Selector};

/// An opened wheel and the registry that owns it.
pub struct Session {
    pub registry: HapticRegistry,
    pub haptic: Haptic,
}

impl Session {
    /// Open the selected wheel through the default drivers.
    pub fn open(selector: Option<Selector>) -> Result<Self, CliError> {
        let api = HidApi::new().map_err(hidhaptic_hid_common::HidCommonError::from)?;
        let joystick = wheels::open_wheel(&api, selector)?;
        let registry = HapticRegistry::with_default_drivers();
        let haptic = registry.open_from_joystick(Arc::new(joystick))?;
        Ok(Self { registry, haptic })
    }

    pub fn close(self) {
        self.registry.close(self.haptic);
    }
}
