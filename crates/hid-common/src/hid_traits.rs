//! Joystick transport trait

use crate::{HidCommonResult, HidDeviceInfo};

/// An opened joystick that can accept raw force-feedback reports.
///
/// Implementations must be shareable between the caller's thread and a
/// driver's background thread, so `send_effect` takes `&self`. Keeping an
/// `Arc` to the transport keeps the underlying device open.
pub trait JoystickTransport: Send + Sync {
    fn info(&self) -> &HidDeviceInfo;

    /// `true` when the joystick is driven by the HIDAPI transport.
    fn is_hidapi(&self) -> bool;

    /// Write one raw report to the device.
    fn send_effect(&self, data: &[u8]) -> HidCommonResult<usize>;

    fn vendor_id(&self) -> u16 {
        self.info().vendor_id
    }

    fn product_id(&self) -> u16 {
        self.info().product_id
    }

    fn product_version(&self) -> u16 {
        self.info().release_number
    }

    fn is_connected(&self) -> bool {
        true
    }
}

pub mod mock {
    use super::*;
    use crate::HidCommonError;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Recording joystick for tests.
    ///
    /// Clones share the same history and failure switches, so a test can keep
    /// one handle while a driver owns another.
    #[derive(Clone)]
    pub struct MockJoystick {
        info: HidDeviceInfo,
        hidapi: bool,
        write_history: Arc<Mutex<Vec<Vec<u8>>>>,
        connected: Arc<AtomicBool>,
        fail_writes: Arc<AtomicBool>,
        fail_after: Arc<Mutex<Option<usize>>>,
        attempts: Arc<AtomicUsize>,
    }

    impl MockJoystick {
        pub fn new(vendor_id: u16, product_id: u16) -> Self {
            let path = format!("mock://{vendor_id:04x}:{product_id:04x}");
            Self {
                info: HidDeviceInfo::new(vendor_id, product_id, path),
                hidapi: true,
                write_history: Arc::new(Mutex::new(Vec::new())),
                connected: Arc::new(AtomicBool::new(true)),
                fail_writes: Arc::new(AtomicBool::new(false)),
                fail_after: Arc::new(Mutex::new(None)),
                attempts: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn with_version(mut self, version: u16) -> Self {
            self.info.release_number = version;
            self
        }

        /// Report the joystick as driven by a non-HIDAPI backend.
        pub fn non_hidapi(mut self) -> Self {
            self.hidapi = false;
            self
        }

        pub fn get_write_history(&self) -> Vec<Vec<u8>> {
            self.write_history.lock().clone()
        }

        pub fn clear_write_history(&self) {
            self.write_history.lock().clear();
        }

        /// Number of `send_effect` calls, failed ones included.
        pub fn write_attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }

        /// Make every write fail until switched back.
        pub fn set_fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        /// Let `count` more writes succeed, then fail the rest.
        pub fn fail_after(&self, count: usize) {
            *self.fail_after.lock() = Some(count);
        }

        pub fn disconnect(&self) {
            self.connected.store(false, Ordering::SeqCst);
        }

        pub fn reconnect(&self) {
            self.connected.store(true, Ordering::SeqCst);
        }
    }

    impl JoystickTransport for MockJoystick {
        fn info(&self) -> &HidDeviceInfo {
            &self.info
        }

        fn is_hidapi(&self) -> bool {
            self.hidapi
        }

        fn send_effect(&self, data: &[u8]) -> HidCommonResult<usize> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if !self.connected.load(Ordering::SeqCst) {
                return Err(HidCommonError::Disconnected);
            }
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(HidCommonError::WriteError("injected failure".to_string()));
            }
            {
                let mut remaining = self.fail_after.lock();
                if let Some(n) = remaining.as_mut() {
                    if *n == 0 {
                        return Err(HidCommonError::WriteError("injected failure".to_string()));
                    }
                    *n -= 1;
                }
            }

            self.write_history.lock().push(data.to_vec());
            Ok(data.len())
        }

        fn is_connected(&self) -> bool {
            self.connected.load(Ordering::SeqCst)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockJoystick;
    use super::*;
    use crate::HidCommonError;

    #[test]
    fn test_mock_joystick_identity() {
        let joystick = MockJoystick::new(0x046d, 0xc294).with_version(0x2100);

        assert_eq!(joystick.vendor_id(), 0x046d);
        assert_eq!(joystick.product_id(), 0xc294);
        assert_eq!(joystick.product_version(), 0x2100);
        assert!(joystick.is_hidapi());
        assert!(joystick.is_connected());
        assert!(!MockJoystick::new(0x046d, 0xc24f).non_hidapi().is_hidapi());
    }

    #[test]
    fn test_mock_joystick_write() -> Result<(), Box<dyn std::error::Error>> {
        let joystick = MockJoystick::new(0x046d, 0xc24f);

        let written = joystick.send_effect(&[0x0d, 0, 0, 0, 0, 0, 0])?;
        assert_eq!(written, 7);

        let history = joystick.get_write_history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0], vec![0x0d, 0, 0, 0, 0, 0, 0]);
        Ok(())
    }

    #[test]
    fn test_mock_joystick_shared_history() -> Result<(), Box<dyn std::error::Error>> {
        let joystick = MockJoystick::new(0x046d, 0xc24f);
        let driver_side = joystick.clone();

        driver_side.send_effect(&[0x14, 0, 0, 0, 0, 0, 0])?;
        assert_eq!(joystick.get_write_history().len(), 1);

        joystick.clear_write_history();
        assert!(driver_side.get_write_history().is_empty());
        Ok(())
    }

    #[test]
    fn test_mock_joystick_disconnect() {
        let joystick = MockJoystick::new(0x046d, 0xc24f);

        joystick.disconnect();
        assert!(!joystick.is_connected());

        let result = joystick.send_effect(&[0x01]);
        assert!(matches!(result, Err(HidCommonError::Disconnected)));
        assert_eq!(joystick.write_attempts(), 1);

        joystick.reconnect();
        assert!(joystick.send_effect(&[0x01]).is_ok());
    }

    #[test]
    fn test_mock_joystick_fail_after() {
        let joystick = MockJoystick::new(0x046d, 0xc24f);
        joystick.fail_after(2);

        assert!(joystick.send_effect(&[1]).is_ok());
        assert!(joystick.send_effect(&[2]).is_ok());
        assert!(matches!(
            joystick.send_effect(&[3]),
            Err(HidCommonError::WriteError(_))
        ));
        assert_eq!(joystick.get_write_history(), vec![vec![1], vec![2]]);
    }

    #[test]
    fn test_mock_joystick_fail_writes_toggle() {
        let joystick = MockJoystick::new(0x046d, 0xc24f);
        joystick.set_fail_writes(true);
        assert!(joystick.send_effect(&[1]).is_err());
        joystick.set_fail_writes(false);
        assert!(joystick.send_effect(&[1]).is_ok());
        assert_eq!(joystick.write_attempts(), 2);
    }
}
