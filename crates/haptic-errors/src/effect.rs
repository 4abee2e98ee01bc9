//! Effect validation and slot bookkeeping errors.

use crate::common::ErrorSeverity;

/// Effect errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EffectError {
    /// Effect kind not rendered by the device
    #[error("Unsupported effect: {kind}")]
    UnsupportedEffect {
        /// Name of the rejected effect kind
        kind: &'static str,
    },

    /// A field of the effect definition is out of range
    #[error("Invalid parameter '{field}': {reason}")]
    InvalidParameter {
        /// Field name
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// An update tried to change the kind of a live effect
    #[error("Updating effect type is illegal: {from} -> {to}")]
    TypeChanged {
        /// Kind of the stored effect
        from: &'static str,
        /// Kind of the rejected update
        to: &'static str,
    },

    /// Every effect slot is allocated
    #[error("All {capacity} effect slots in use")]
    SlotExhausted {
        /// Number of effect slots on the device
        capacity: usize,
    },

    /// Id out of range or slot not allocated
    #[error("Bad effect id {id}")]
    BadEffectId {
        /// The offending id
        id: i32,
    },
}

impl EffectError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EffectError::SlotExhausted { .. } => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Create an invalid parameter error.
    pub fn invalid_parameter(field: &'static str, reason: impl Into<String>) -> Self {
        EffectError::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }
}
