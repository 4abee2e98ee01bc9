//! Wheel discovery over hidapi.

use std::str::FromStr;

use hidapi::HidApi;
use hidhaptic_hid_common::{HidDeviceInfo, HidapiJoystick};
use hidhaptic_logitech_protocol::{LOGITECH_VENDOR_ID, LogitechModel, is_supported_product};
use serde::Serialize;
use tracing::debug;

use crate::error::CliError;

/// A connected wheel the lg4ff driver can drive.
#[derive(Debug, Clone, Serialize)]
pub struct WheelInfo {
    pub id: String,
    pub name: String,
    pub model: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub version: u16,
    pub ffex: bool,
    pub path: String,
}

impl WheelInfo {
    fn from_device(info: &HidDeviceInfo) -> Self {
        let model = LogitechModel::from_ids(info.product_id, info.release_number);
        Self {
            id: info.id_string(),
            name: info.display_name(),
            model: model.to_string(),
            vendor_id: info.vendor_id,
            product_id: info.product_id,
            version: info.release_number,
            ffex: model.is_ffex(),
            path: info.path.clone(),
        }
    }
}

/// `VID:PID` pair picking one wheel, in hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selector {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl Selector {
    fn matches(&self, info: &HidDeviceInfo) -> bool {
        info.matches(self.vendor_id, self.product_id)
    }
}

impl FromStr for Selector {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CliError::InvalidSelector(s.to_string());
        let (vid, pid) = s.split_once(':').ok_or_else(invalid)?;
        Ok(Self {
            vendor_id: parse_hex_u16(vid).ok_or_else(invalid)?,
            product_id: parse_hex_u16(pid).ok_or_else(invalid)?,
        })
    }
}

fn parse_hex_u16(s: &str) -> Option<u16> {
    let s = s.trim();
    let s = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u16::from_str_radix(s, 16).ok()
}

fn is_supported_wheel(info: &HidDeviceInfo) -> bool {
    info.vendor_id == LOGITECH_VENDOR_ID && is_supported_product(info.product_id)
}

/// Supported wheels, one entry per device path.
pub fn list_wheels(api: &HidApi) -> Vec<WheelInfo> {
    let mut wheels: Vec<WheelInfo> = Vec::new();
    for info in api.device_list().map(HidDeviceInfo::from) {
        if !is_supported_wheel(&info) || wheels.iter().any(|w| w.path == info.path) {
            continue;
        }
        wheels.push(WheelInfo::from_device(&info));
    }
    wheels
}

/// Open the first supported wheel, or the one matching `selector`.
pub fn open_wheel(api: &HidApi, selector: Option<Selector>) -> Result<HidapiJoystick, CliError> {
    let device = api.device_list().find(|d| {
        let info = HidDeviceInfo::from(*d);
        match selector {
            Some(selector) => selector.matches(&info),
            None => is_supported_wheel(&info),
        }
    });

    let Some(device) = device else {
        return Err(match selector {
            Some(s) => CliError::DeviceNotFound(format!("{:04x}:{:04x}", s.vendor_id, s.product_id)),
            None => CliError::NoWheel,
        });
    };

    debug!(
        vendor_id = device.vendor_id(),
        product_id = device.product_id(),
        "Opening wheel"
    );
    Ok(HidapiJoystick::open(api, device)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_selector_parsing() -> TestResult {
        let selector: Selector = "046d:c24f".parse()?;
        assert_eq!(
            selector,
            Selector {
                vendor_id: 0x046d,
                product_id: 0xc24f
            }
        );
        let prefixed: Selector = "0x046D:0xC294".parse()?;
        assert_eq!(prefixed.product_id, 0xc294);
        Ok(())
    }

    #[test]
    fn test_selector_rejects_garbage() {
        assert!("046dc24f".parse::<Selector>().is_err());
        assert!("zz:c24f".parse::<Selector>().is_err());
        assert!("046d:1c24f".parse::<Selector>().is_err());
    }

    #[test]
    fn test_wheel_info_from_ffex() {
        let info = HidDeviceInfo::new(0x046d, 0xc294, "/dev/hidraw3".to_string())
            .with_release_number(0x2100)
            .with_product_name("Logitech Formula Force EX");
        let wheel = WheelInfo::from_device(&info);
        assert!(wheel.ffex);
        assert_eq!(wheel.id, "046d:c294");
        assert_eq!(wheel.name, "Logitech Formula Force EX");
        assert!(is_supported_wheel(&info));
    }
}
