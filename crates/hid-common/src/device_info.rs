//! Device information types for HID joysticks

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HidDeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    /// bcdDevice, reported by the joystick layer as the product version
    pub release_number: u16,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub product_name: Option<String>,
    pub path: String,
}

impl HidDeviceInfo {
    pub fn new(vendor_id: u16, product_id: u16, path: String) -> Self {
        Self {
            vendor_id,
            product_id,
            release_number: 0,
            serial_number: None,
            manufacturer: None,
            product_name: None,
            path,
        }
    }

    pub fn with_release_number(mut self, release_number: u16) -> Self {
        self.release_number = release_number;
        self
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = Some(serial.into());
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }

    /// `vvvv:pppp` identifier used in logs and error messages.
    pub fn id_string(&self) -> String {
        format!("{:04x}:{:04x}", self.vendor_id, self.product_id)
    }

    pub fn display_name(&self) -> String {
        self.product_name
            .clone()
            .or_else(|| self.manufacturer.clone())
            .unwrap_or_else(|| self.id_string())
    }
}

impl From<&hidapi::DeviceInfo> for HidDeviceInfo {
    fn from(info: &hidapi::DeviceInfo) -> Self {
        Self {
            vendor_id: info.vendor_id(),
            product_id: info.product_id(),
            release_number: info.release_number(),
            serial_number: info.serial_number().map(str::to_owned),
            manufacturer: info.manufacturer_string().map(str::to_owned),
            product_name: info.product_string().map(str::to_owned),
            path: info.path().to_string_lossy().into_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_info_creation() {
        let info = HidDeviceInfo::new(0x046d, 0xc24f, "/dev/hidraw0".to_string())
            .with_release_number(0x0100);
        assert_eq!(info.vendor_id, 0x046d);
        assert_eq!(info.product_id, 0xc24f);
        assert_eq!(info.release_number, 0x0100);
        assert!(info.matches(0x046d, 0xc24f));
        assert!(!info.matches(0x046d, 0x9999));
    }

    #[test]
    fn test_device_info_display_name() {
        let info = HidDeviceInfo::new(0x046d, 0xc24f, "/dev/hidraw0".to_string())
            .with_product_name("G29 Driving Force Racing Wheel");
        assert_eq!(info.display_name(), "G29 Driving Force Racing Wheel");

        let info = HidDeviceInfo::new(0x046d, 0xc24f, "/dev/hidraw0".to_string())
            .with_manufacturer("Logitech");
        assert_eq!(info.display_name(), "Logitech");

        let info = HidDeviceInfo::new(0x046d, 0xc24f, "/dev/hidraw0".to_string());
        assert_eq!(info.display_name(), "046d:c24f");
    }

    #[test]
    fn test_device_info_serde() -> Result<(), Box<dyn std::error::Error>> {
        let info = HidDeviceInfo::new(0x046d, 0xc294, "/dev/hidraw3".to_string())
            .with_release_number(0x2100)
            .with_serial("ABC123");
        let json = serde_json::to_string(&info)?;
        let back: HidDeviceInfo = serde_json::from_str(&json)?;
        assert_eq!(back, info);
        Ok(())
    }
}
