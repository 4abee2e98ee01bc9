//! Joystick transport boundary for the haptic stack
//!
//! The haptic drivers never talk to `hidapi` directly. They receive an
//! `Arc<dyn JoystickTransport>` that answers identity queries and forwards raw
//! effect reports to the device. This crate provides that trait, the `hidapi`
//! backed implementation and a recording mock for tests.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod device_info;
pub mod hid_traits;
pub mod hidapi_backend;

pub use device_info::*;
pub use hid_traits::*;
pub use hidapi_backend::HidapiJoystick;

use hidhaptic_errors::DeviceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HidCommonError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Failed to open device: {0}")]
    OpenError(String),

    #[error("Failed to write to device: {0}")]
    WriteError(String),

    #[error("Short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    #[error("Device disconnected")]
    Disconnected,

    #[error("hidapi error: {0}")]
    Hidapi(#[from] hidapi::HidError),
}

impl HidCommonError {
    /// Convert into the haptic-level transport error for `device`.
    pub fn into_device_error(self, device: impl Into<String>) -> DeviceError {
        DeviceError::transport(device, self.to_string())
    }
}

pub type HidCommonResult<T> = Result<T, HidCommonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_types() {
        let err = HidCommonError::DeviceNotFound("test".to_string());
        assert_eq!(format!("{}", err), "Device not found: test");

        let err = HidCommonError::Disconnected;
        assert_eq!(format!("{}", err), "Device disconnected");
    }

    #[test]
    fn test_into_device_error() {
        let err = HidCommonError::ShortWrite {
            written: 3,
            expected: 7,
        }
        .into_device_error("046d:c24f");
        assert_eq!(
            err,
            DeviceError::transport("046d:c24f", "Short write: 3 of 7 bytes")
        );
    }
}
