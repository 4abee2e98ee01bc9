//! Top-level error type and classification helpers.

use core::fmt;

use crate::{DeviceError, EffectError};

/// Top-level error type returned by every haptic operation.
///
/// The `Display` output is the "last error" string surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HapticError {
    /// Device support, transport and lifecycle errors
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    /// Effect validation and slot errors
    #[error("Effect error: {0}")]
    Effect(#[from] EffectError),
}

impl HapticError {
    /// Get the error category for classification.
    pub fn category(&self) -> ErrorCategory {
        match self {
            HapticError::Device(DeviceError::Transport { .. })
            | HapticError::Device(DeviceError::DeviceLost { .. }) => ErrorCategory::Transport,
            HapticError::Device(_) => ErrorCategory::Device,
            HapticError::Effect(_) => ErrorCategory::Effect,
        }
    }

    /// Get the error severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            HapticError::Device(e) => e.severity(),
            HapticError::Effect(e) => e.severity(),
        }
    }

    /// Check if this error leaves the device usable.
    pub fn is_recoverable(&self) -> bool {
        self.severity() < ErrorSeverity::Critical
    }

    /// Shorthand for [`DeviceError::Unsupported`].
    pub fn unsupported(feature: &'static str) -> Self {
        DeviceError::Unsupported { feature }.into()
    }
}

/// Error category for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Device support and lifecycle errors
    Device = 0,
    /// HID write failures and lost devices
    Transport = 1,
    /// Effect definition and slot errors
    Effect = 2,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Device => write!(f, "Device"),
            ErrorCategory::Transport => write!(f, "Transport"),
            ErrorCategory::Effect => write!(f, "Effect"),
        }
    }
}

/// Error severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// Informational, no action required
    Info = 0,
    /// Warning, may require attention
    Warning = 1,
    /// Error, operation failed
    Error = 2,
    /// Critical, the device is no longer usable
    Critical = 3,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::Device.to_string(), "Device");
        assert_eq!(ErrorCategory::Transport.to_string(), "Transport");
        assert_eq!(ErrorCategory::Effect.to_string(), "Effect");
    }

    #[test]
    fn test_error_severity_ordering() {
        assert!(ErrorSeverity::Critical > ErrorSeverity::Error);
        assert!(ErrorSeverity::Error > ErrorSeverity::Warning);
        assert!(ErrorSeverity::Warning > ErrorSeverity::Info);
    }

    #[test]
    fn test_haptic_error_category() {
        let err: HapticError = DeviceError::unsupported(0x046d, 0xc24f).into();
        assert_eq!(err.category(), ErrorCategory::Device);

        let err: HapticError = DeviceError::transport("g29", "write failed").into();
        assert_eq!(err.category(), ErrorCategory::Transport);

        let err: HapticError = EffectError::BadEffectId { id: 42 }.into();
        assert_eq!(err.category(), ErrorCategory::Effect);
    }

    #[test]
    fn test_lost_device_is_not_recoverable() {
        let err: HapticError = DeviceError::DeviceLost {
            device: "g29".into(),
            consecutive_failures: 250,
        }
        .into();
        assert!(!err.is_recoverable());
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_haptic_error_is_std_error() {
        let err = HapticError::unsupported("pause");
        let _: &dyn std::error::Error = &err;
    }
}
