//! Device and transport error types.
//!
//! This module covers device support checks, HID transport failures and the
//! lifecycle of an opened haptic device.

use crate::common::ErrorSeverity;

/// Device and transport errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// Vendor/product pair not handled by any driver
    #[error("Unsupported device: vendor={vendor_id:#06x}, product={product_id:#06x}")]
    UnsupportedDevice {
        /// USB vendor ID
        vendor_id: u16,
        /// USB product ID
        product_id: u16,
    },

    /// The joystick is not driven by the HIDAPI transport
    #[error("Cannot open hidapi haptic from non hidapi joystick")]
    NotHidapi,

    /// No registered driver accepted the joystick
    #[error("No supported HIDAPI haptic driver found for joystick")]
    NoDriver,

    /// A HID write failed
    #[error("Transport failure on device {device}: {message}")]
    Transport {
        /// Device identifier
        device: String,
        /// Error message
        message: String,
    },

    /// Device setup aborted during open
    #[error("Failed to initialize device {device}: {reason}")]
    InitializationFailed {
        /// Device identifier
        device: String,
        /// Failure reason
        reason: String,
    },

    /// Background writes kept failing; the device is treated as disconnected
    #[error("Device {device} lost after {consecutive_failures} consecutive failed updates")]
    DeviceLost {
        /// Device identifier
        device: String,
        /// Length of the failure streak that tripped the policy
        consecutive_failures: u32,
    },

    /// The haptic handle was closed
    #[error("Haptic device {device} is closed")]
    Closed {
        /// Device identifier
        device: String,
    },

    /// Feature not implemented by the driver
    #[error("That operation is not supported: {feature}")]
    Unsupported {
        /// Feature name
        feature: &'static str,
    },
}

impl DeviceError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            DeviceError::UnsupportedDevice { .. } => ErrorSeverity::Error,
            DeviceError::NotHidapi => ErrorSeverity::Error,
            DeviceError::NoDriver => ErrorSeverity::Error,
            DeviceError::Transport { .. } => ErrorSeverity::Error,
            DeviceError::InitializationFailed { .. } => ErrorSeverity::Error,
            DeviceError::DeviceLost { .. } => ErrorSeverity::Critical,
            DeviceError::Closed { .. } => ErrorSeverity::Error,
            DeviceError::Unsupported { .. } => ErrorSeverity::Info,
        }
    }

    /// Check if the device can no longer be driven.
    pub fn is_device_unavailable(&self) -> bool {
        matches!(
            self,
            DeviceError::DeviceLost { .. } | DeviceError::Closed { .. }
        )
    }

    /// Create an unsupported device error.
    pub fn unsupported(vendor_id: u16, product_id: u16) -> Self {
        DeviceError::UnsupportedDevice {
            vendor_id,
            product_id,
        }
    }

    /// Create a transport error.
    pub fn transport(device: impl Into<String>, message: impl Into<String>) -> Self {
        DeviceError::Transport {
            device: device.into(),
            message: message.into(),
        }
    }

    /// Create an initialization error.
    pub fn initialization(device: impl Into<String>, reason: impl Into<String>) -> Self {
        DeviceError::InitializationFailed {
            device: device.into(),
            reason: reason.into(),
        }
    }
}
