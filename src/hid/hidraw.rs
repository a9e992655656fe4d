use super::framed;
use crate::session::{DeviceHandle, TransportError};
use std::fs::OpenOptions;
use std::io;
use std::os::fd::{AsRawFd, IntoRawFd, OwnedFd};
use std::path::Path;

/// A panel opened through its /dev/hidrawN node.
pub struct HidrawDevice {
    fd: OwnedFd,
}

impl HidrawDevice {
    pub fn open(path: &Path) -> Result<Self, TransportError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(TransportError::Open)?;
        Ok(Self {
            fd: OwnedFd::from(file),
        })
    }
}

impl DeviceHandle for HidrawDevice {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let report = framed(bytes, 0);
        let ret = unsafe {
            libc::write(
                self.fd.as_raw_fd(),
                report.as_ptr() as *const libc::c_void,
                report.len(),
            )
        };
        if ret < 0 {
            return Err(TransportError::Write(io::Error::last_os_error()));
        }

        let written = ret as usize;
        if written < report.len() {
            Err(TransportError::ShortWrite {
                written,
                expected: report.len(),
            })
        } else {
            Ok(())
        }
    }

    fn close(self: Box<Self>) -> Result<(), TransportError> {
        let fd = self.fd.into_raw_fd();
        if unsafe { libc::close(fd) } < 0 {
            Err(TransportError::Close(io::Error::last_os_error()))
        } else {
            Ok(())
        }
    }
}
