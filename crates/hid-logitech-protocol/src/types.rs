//! Logitech device model classification.

#![deny(static_mut_refs)]

use crate::ids::{FFEX_VERSION, product_ids};

/// Logitech wheel model classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogitechModel {
    /// G29 Driving Force Racing Wheel.
    G29,
    /// G27 Racing Wheel.
    G27,
    /// G25 Racing Wheel.
    G25,
    /// Driving Force GT.
    DrivingForceGt,
    /// Driving Force Pro.
    DrivingForcePro,
    /// Driving Force EX.
    DrivingForceEx,
    /// Formula Force EX, the legacy wheel with its own autocenter command.
    FormulaForceEx,
    /// Unknown or unsupported Logitech product.
    Unknown,
}

impl LogitechModel {
    /// Classify a device by product ID and device version.
    pub fn from_ids(product_id: u16, version: u16) -> Self {
        match product_id {
            product_ids::G29 => Self::G29,
            product_ids::G27 => Self::G27,
            product_ids::G25 => Self::G25,
            product_ids::DFGT => Self::DrivingForceGt,
            product_ids::DFP => Self::DrivingForcePro,
            product_ids::WHEEL if version == FFEX_VERSION => Self::FormulaForceEx,
            product_ids::WHEEL => Self::DrivingForceEx,
            _ => Self::Unknown,
        }
    }

    /// Whether this is the Formula Force EX.
    pub fn is_ffex(self) -> bool {
        self == Self::FormulaForceEx
    }

    /// Marketing name of the wheel.
    pub fn name(self) -> &'static str {
        match self {
            Self::G29 => "Logitech G29",
            Self::G27 => "Logitech G27",
            Self::G25 => "Logitech G25",
            Self::DrivingForceGt => "Logitech Driving Force GT",
            Self::DrivingForcePro => "Logitech Driving Force Pro",
            Self::DrivingForceEx => "Logitech Driving Force EX",
            Self::FormulaForceEx => "Logitech Formula Force EX",
            Self::Unknown => "Unknown Logitech device",
        }
    }
}

impl std::fmt::Display for LogitechModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
