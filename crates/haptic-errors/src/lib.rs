//! Centralized error types for hidhaptic
//!
//! Every public operation of the haptic stack reports failure through
//! [`HapticError`], which wraps the two sub-domains:
//!
//! - [`device`]: device support, transport and lifecycle failures
//! - [`effect`]: effect validation and effect-slot bookkeeping failures
//!
//! [`common`] holds the classification helpers (category, severity) shared by
//! both.
//!
//! # Example
//!
//! ```
//! use hidhaptic_errors::prelude::*;
//!
//! fn check_period(period: u16) -> Result<u16> {
//!     if period == 0 {
//!         return Err(EffectError::invalid_parameter("period", "must be non-zero").into());
//!     }
//!     Ok(period)
//! }
//!
//! assert!(check_period(0).is_err());
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod common;
pub mod device;
pub mod effect;
pub mod prelude;

pub use common::{ErrorCategory, ErrorSeverity, HapticError};
pub use device::DeviceError;
pub use effect::EffectError;

/// A specialized `Result` type for haptic operations.
pub type Result<T> = std::result::Result<T, HapticError>;
