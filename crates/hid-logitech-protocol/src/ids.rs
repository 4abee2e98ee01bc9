//! Logitech USB vendor and product ID constants.

#![deny(static_mut_refs)]

/// Logitech USB vendor ID.
pub const LOGITECH_VENDOR_ID: u16 = 0x046D;

/// Every lg4ff command is a 7-byte report.
pub const REPORT_LEN: usize = 7;

/// Device version (bcdDevice) reported by the Formula Force EX.
///
/// The FF-EX shares its product ID with the Driving Force EX; only the
/// version tells them apart.
pub const FFEX_VERSION: u16 = 0x2100;

/// Command bytes (byte 0 of a report) outside the slot protocol.
pub mod commands {
    /// Set/unset fixed loop mode.
    pub const FIXED_LOOP: u8 = 0x0D;
    /// Disable the built-in autocenter spring.
    pub const AUTOCENTER_DISABLE: u8 = 0xF5;
    /// Extended command prefix, followed by a sub-command in byte 1.
    pub const EXTENDED: u8 = 0xFE;
    /// Activate the built-in autocenter spring.
    pub const AUTOCENTER_ENABLE: u8 = 0x14;
}

/// Sub-commands carried in byte 1 after [`commands::EXTENDED`].
pub mod extended {
    /// Configure autocenter spring strength.
    pub const AUTOCENTER_STRENGTH: u8 = 0x0D;
    /// FF-EX autocenter magnitude.
    pub const FFEX_AUTOCENTER: u8 = 0x03;
}

/// Logitech wheel product IDs handled by the lg4ff driver.
pub mod product_ids {
    /// G29 Driving Force Racing Wheel.
    pub const G29: u16 = 0xC24F;
    /// G27 Racing Wheel.
    pub const G27: u16 = 0xC29B;
    /// G25 Racing Wheel.
    pub const G25: u16 = 0xC299;
    /// Driving Force GT.
    pub const DFGT: u16 = 0xC29A;
    /// Driving Force Pro.
    pub const DFP: u16 = 0xC298;
    /// Driving Force EX and Formula Force EX (told apart by version).
    pub const WHEEL: u16 = 0xC294;
}

/// Product IDs accepted by the lg4ff haptic driver.
pub const SUPPORTED_PRODUCT_IDS: [u16; 6] = [
    product_ids::G29,
    product_ids::G27,
    product_ids::G25,
    product_ids::DFGT,
    product_ids::DFP,
    product_ids::WHEEL,
];

/// Return `true` if `product_id` is a wheel the lg4ff driver renders for.
pub fn is_supported_product(product_id: u16) -> bool {
    SUPPORTED_PRODUCT_IDS.contains(&product_id)
}
