//! Generic haptic API over HIDAPI force-feedback drivers
//!
//! [`HapticRegistry`] holds the registered drivers (lg4ff by default) and
//! the devices opened through them. Each open device is used through a
//! [`Haptic`] handle, which validates calls before they reach the driver
//! and offers a simple rumble interface.
//!
//! ```
//! use std::sync::Arc;
//!
//! use hidhaptic::HapticRegistry;
//! use hidhaptic_effects::ConstantEffect;
//! use hidhaptic_hid_common::mock::MockJoystick;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = HapticRegistry::with_default_drivers();
//! let haptic = registry.open_from_joystick(Arc::new(MockJoystick::new(0x046d, 0xc24f)))?;
//!
//! let id = haptic.new_effect(&ConstantEffect::new(8000).into())?;
//! haptic.run_effect(id, 1)?;
//! haptic.stop_effect(id)?;
//! registry.close(haptic);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod haptic;
pub mod registry;
pub mod rumble;

pub use config::{ENV_GAIN_MAX, HapticConfig};
pub use haptic::{Haptic, HapticId, OpenDevice};
pub use registry::HapticRegistry;
pub use rumble::{RUMBLE_LENGTH, RUMBLE_MAGNITUDE, RUMBLE_PERIOD};

pub use hidhaptic_driver::{EffectId, EffectStatus};
pub use hidhaptic_errors::{DeviceError, EffectError, HapticError, Result};
