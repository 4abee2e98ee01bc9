//! Logitech lg4ff HID protocol: device ids, slot command encoding and
//! device-level reports.
//!
//! This crate is intentionally I/O-free and allocation-free.
//! It provides pure functions and types that can be tested without hardware.

#![deny(static_mut_refs)]

pub mod ids;
pub mod output;
pub mod slot;
pub mod types;

pub use ids::{
    FFEX_VERSION, LOGITECH_VENDOR_ID, REPORT_LEN, SUPPORTED_PRODUCT_IDS, is_supported_product,
    product_ids,
};
pub use output::{
    AutocenterCommands, autocenter_commands, autocenter_magnitude,
    build_autocenter_disable_report, build_autocenter_enable_report,
    build_autocenter_strength_report, build_ffex_autocenter_report, build_fixed_loop_report,
};
pub use slot::{SLOT_COUNT, Slot, SlotKind, SlotOp, SlotParameters, translate_force};
pub use types::LogitechModel;
