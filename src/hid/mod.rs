#[cfg(target_os = "linux")]
pub mod hidraw;
#[cfg(target_os = "windows")]
pub mod windows_hid;

use crate::session::{DeviceHandle, DeviceRef, Transport, TransportError};

/// Report number the OS expects ahead of the data. The panel does not use
/// numbered reports, so it is always zero and never reaches the device.
const REPORT_ID: u8 = 0x00;

/// Prefix the report number and zero-pad up to the interface's output report
/// length (zero when the OS does not require padding).
fn framed(bytes: &[u8], report_len: usize) -> Vec<u8> {
    let mut report = Vec::with_capacity(report_len.max(1 + bytes.len()));
    report.push(REPORT_ID);
    report.extend_from_slice(bytes);
    if report.len() < report_len {
        report.resize(report_len, 0);
    }
    report
}

/// Opens panels through the platform's raw HID interface.
pub struct HidTransport;

impl Transport for HidTransport {
    fn open(&self, device: &DeviceRef) -> Result<Box<dyn DeviceHandle>, TransportError> {
        #[cfg(target_os = "linux")]
        let handle = hidraw::HidrawDevice::open(&device.path)?;
        #[cfg(target_os = "windows")]
        let handle = windows_hid::WinHidDevice::open(&device.path)?;

        Ok(Box::new(handle))
    }
}
