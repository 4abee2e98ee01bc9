//! Contract between the generic haptic layer and HIDAPI haptic backends
//!
//! A [`HapticDriver`] decides whether it can handle a joystick and opens it
//! into a [`HapticDevice`], which exposes the effect table and device-level
//! controls the generic layer dispatches to.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod driver;
pub mod types;

pub use driver::{HapticDevice, HapticDriver};
pub use types::{EffectId, EffectStatus};
