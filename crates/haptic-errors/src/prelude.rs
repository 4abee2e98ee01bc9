//! Prelude module for convenient error handling imports.
//!
//! ```
//! use hidhaptic_errors::prelude::*;
//!
//! fn open(vendor_id: u16, product_id: u16) -> Result<()> {
//!     Err(DeviceError::unsupported(vendor_id, product_id).into())
//! }
//!
//! assert!(open(0x1234, 0x5678).is_err());
//! ```

pub use crate::{
    Result,
    common::{ErrorCategory, ErrorSeverity, HapticError},
    device::DeviceError,
    effect::EffectError,
};
