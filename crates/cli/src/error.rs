//! Error types for haptic-test

use hidhaptic::HapticError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("No supported wheel found")]
    NoWheel,

    #[error("Wheel not found: {0}")]
    DeviceNotFound(String),

    #[error("Invalid device selector '{0}', expected VID:PID in hex")]
    InvalidSelector(String),

    #[error("Invalid effect: {0}")]
    InvalidEffect(String),

    #[error("Effect not supported by the wheel: {0}")]
    UnsupportedEffect(&'static str),

    #[error("HID error: {0}")]
    Hid(#[from] hidhaptic_hid_common::HidCommonError),

    #[error("Haptic error: {0}")]
    Haptic(#[from] HapticError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NoWheel | CliError::DeviceNotFound(_) => 2,
            CliError::InvalidSelector(_)
            | CliError::InvalidEffect(_)
            | CliError::JsonError(_) => 4,
            CliError::Hid(_) => 3,
            CliError::UnsupportedEffect(_) => 5,
            CliError::Haptic(_) => 6,
            CliError::IoError(_) => 1,
        }
    }
}
