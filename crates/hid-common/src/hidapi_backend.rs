//! `hidapi` backed joystick transport.

use hidapi::{HidApi, HidDevice};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::{HidCommonError, HidCommonResult, HidDeviceInfo, JoystickTransport};

/// A joystick opened through `hidapi`.
///
/// Effect reports are written raw: the first byte of each report goes out as
/// the report id, which is what the lg4ff family expects for its 7-byte slot
/// commands.
pub struct HidapiJoystick {
    info: HidDeviceInfo,
    device: Mutex<HidDevice>,
}

impl HidapiJoystick {
    /// Open the device described by `info`.
    pub fn open(api: &HidApi, info: &hidapi::DeviceInfo) -> HidCommonResult<Self> {
        let device_info = HidDeviceInfo::from(info);
        let device = info.open_device(api).map_err(|e| {
            HidCommonError::OpenError(format!("{}: {e}", device_info.id_string()))
        })?;
        debug!(
            device = %device_info.id_string(),
            version = format_args!("{:#06x}", device_info.release_number),
            path = %device_info.path,
            "Opened HID joystick"
        );
        Ok(Self {
            info: device_info,
            device: Mutex::new(device),
        })
    }

    /// Open the first enumerated device matching `vendor_id`/`product_id`.
    pub fn open_ids(api: &HidApi, vendor_id: u16, product_id: u16) -> HidCommonResult<Self> {
        let info = api
            .device_list()
            .find(|d| d.vendor_id() == vendor_id && d.product_id() == product_id)
            .ok_or_else(|| {
                HidCommonError::DeviceNotFound(format!("{vendor_id:04x}:{product_id:04x}"))
            })?;
        Self::open(api, info)
    }
}

impl JoystickTransport for HidapiJoystick {
    fn info(&self) -> &HidDeviceInfo {
        &self.info
    }

    fn is_hidapi(&self) -> bool {
        true
    }

    fn send_effect(&self, data: &[u8]) -> HidCommonResult<usize> {
        let written = self.device.lock().write(data)?;
        trace!(device = %self.info.id_string(), report = ?data, written, "HID write");
        if written < data.len() {
            return Err(HidCommonError::ShortWrite {
                written,
                expected: data.len(),
            });
        }
        Ok(written)
    }
}

impl std::fmt::Debug for HidapiJoystick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HidapiJoystick")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}
