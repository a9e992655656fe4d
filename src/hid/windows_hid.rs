use super::framed;
use crate::session::{DeviceHandle, TransportError};
use std::io;
use std::path::Path;
use windows::core::PCWSTR;
use windows::Win32::Devices::HumanInterfaceDevice::*;
use windows::Win32::Foundation::*;
use windows::Win32::Storage::FileSystem::*;

pub struct WinHidDevice {
    handle: HANDLE,
    /// OutputReportByteLength from the interface caps; writes are padded to it.
    output_len: usize,
}

// The handle is owned exclusively by one session and only used from the
// thread that currently holds the session.
unsafe impl Send for WinHidDevice {}

impl WinHidDevice {
    pub fn open(path: &Path) -> Result<Self, TransportError> {
        let wide: Vec<u16> = path
            .to_string_lossy()
            .encode_utf16()
            .chain(std::iter::once(0))
            .collect();

        let handle = unsafe {
            CreateFileW(
                PCWSTR(wide.as_ptr()),
                0x80000000 | 0x40000000, // GENERIC_READ | GENERIC_WRITE
                FILE_SHARE_READ | FILE_SHARE_WRITE,
                None,
                OPEN_EXISTING,
                FILE_FLAGS_AND_ATTRIBUTES(0),
                None,
            )
        }
        .map_err(|e| {
            TransportError::Open(io::Error::new(
                io::ErrorKind::PermissionDenied,
                e.to_string(),
            ))
        })?;

        let output_len = unsafe { output_report_len(handle) };
        Ok(Self { handle, output_len })
    }
}

unsafe fn output_report_len(handle: HANDLE) -> usize {
    let mut preparsed_data = PHIDP_PREPARSED_DATA::default();
    if !HidD_GetPreparsedData(handle, &mut preparsed_data) {
        return 0;
    }

    let mut caps = HIDP_CAPS::default();
    let len = if HidP_GetCaps(preparsed_data, &mut caps) == HIDP_STATUS_SUCCESS {
        caps.OutputReportByteLength as usize
    } else {
        0
    };

    if preparsed_data.0 != 0 {
        let _ = HidD_FreePreparsedData(preparsed_data);
    }
    len
}

impl Drop for WinHidDevice {
    fn drop(&mut self) {
        if !self.handle.is_invalid() {
            unsafe {
                let _ = CloseHandle(self.handle);
            }
        }
    }
}

impl DeviceHandle for WinHidDevice {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let report = framed(bytes, self.output_len);
        let ok = unsafe {
            HidD_SetOutputReport(
                self.handle,
                report.as_ptr() as *const std::ffi::c_void,
                report.len() as u32,
            )
        };
        if ok {
            Ok(())
        } else {
            Err(TransportError::Write(io::Error::other(
                "HidD_SetOutputReport failed",
            )))
        }
    }

    fn close(mut self: Box<Self>) -> Result<(), TransportError> {
        let handle = std::mem::take(&mut self.handle);
        unsafe { CloseHandle(handle) }
            .map_err(|e| TransportError::Close(io::Error::other(e.to_string())))
    }
}
