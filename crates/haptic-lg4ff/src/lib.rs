//! Force-feedback driver for Logitech lg4ff wheels over HIDAPI
//!
//! The wheel firmware exposes four fixed effect slots (constant force,
//! spring, damper, friction). This crate keeps a table of up to sixteen
//! host-side effects, renders them every 2 ms on a background thread, folds
//! them into the four slots and writes only the slot commands that changed.
//!
//! - [`RendererState`]: effect table, slot aggregation and gain, no I/O
//! - [`Lg4ffDevice`]: the opened device and its update thread
//! - [`Lg4ffDriver`]: the [`hidhaptic_driver::HapticDriver`] entry point
//! - [`Lg4ffConfig`]: intensity caps and gain read at open time

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod clock;
pub mod config;
pub mod device;
pub mod driver;
pub mod renderer;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::Lg4ffConfig;
pub use device::{CLOSE_GRACE_PERIOD, Lg4ffDevice, TICK_PERIOD};
pub use driver::Lg4ffDriver;
pub use renderer::{
    DEVICE_LOST_THRESHOLD, LG4FF_FEATURES, LinkEvent, MAX_EFFECTS, RendererState, SlotCommand,
};
