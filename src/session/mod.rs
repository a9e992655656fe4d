pub mod dispatcher;

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub const MIRA_VENDOR_ID: u16 = 0x0416;
pub const MIRA_PRODUCT_ID: u16 = 0x5020;

/// Panel generation, which decides how long the hardware needs to settle
/// after a light or refresh command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Mira,
    Unknown,
}

impl DeviceClass {
    pub fn settle_delay(self) -> Duration {
        match self {
            DeviceClass::Mira => Duration::from_millis(100),
            DeviceClass::Unknown => Duration::from_millis(500),
        }
    }
}

/// An attached panel as reported by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceRef {
    pub vendor_id: u16,
    pub product_id: u16,
    /// OS device node, unique per attached panel.
    pub path: PathBuf,
    pub serial: Option<String>,
}

impl DeviceRef {
    pub fn class(&self) -> DeviceClass {
        match (self.vendor_id, self.product_id) {
            (MIRA_VENDOR_ID, MIRA_PRODUCT_ID) => DeviceClass::Mira,
            _ => DeviceClass::Unknown,
        }
    }
}

impl fmt::Display for DeviceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04x}:{:04x} at {}",
            self.vendor_id,
            self.product_id,
            self.path.display()
        )?;
        if let Some(serial) = &self.serial {
            write!(f, " (serial {})", serial)?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("open failed: {0}")]
    Open(#[source] io::Error),
    #[error("write failed: {0}")]
    Write(#[source] io::Error),
    #[error("short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },
    #[error("close failed: {0}")]
    Close(#[source] io::Error),
}

/// An open panel. Exactly one exists per device per session.
pub trait DeviceHandle: Send {
    /// Send one opcode-prefixed command, unframed.
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError>;
    fn close(self: Box<Self>) -> Result<(), TransportError>;
}

pub trait Transport: Sync {
    fn open(&self, device: &DeviceRef) -> Result<Box<dyn DeviceHandle>, TransportError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStage {
    Open,
    /// Index of the command that failed.
    Write(usize),
    Close,
}

impl fmt::Display for SessionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStage::Open => write!(f, "open"),
            SessionStage::Write(index) => write!(f, "command #{}", index + 1),
            SessionStage::Close => write!(f, "close"),
        }
    }
}

#[derive(Debug, Error)]
#[error("{device}: {stage}: {cause}")]
pub struct DeviceSessionError {
    pub device: DeviceRef,
    pub stage: SessionStage,
    #[source]
    pub cause: TransportError,
}

#[derive(Debug)]
pub enum DeviceResult {
    Applied {
        device: DeviceRef,
        commands: usize,
    },
    Failed {
        device: DeviceRef,
        error: DeviceSessionError,
    },
    /// The run was interrupted; `written` commands reached the panel before
    /// its handle was released.
    Cancelled {
        device: DeviceRef,
        written: usize,
    },
}

impl DeviceResult {
    pub fn device(&self) -> &DeviceRef {
        match self {
            DeviceResult::Applied { device, .. }
            | DeviceResult::Failed { device, .. }
            | DeviceResult::Cancelled { device, .. } => device,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, DeviceResult::Applied { .. })
    }
}

impl fmt::Display for DeviceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceResult::Applied { device, commands } => {
                write!(f, "{}: applied {} command(s)", device, commands)
            }
            DeviceResult::Failed { error, .. } => write!(f, "{}", error),
            DeviceResult::Cancelled { device, written } => {
                write!(f, "{}: cancelled after {} command(s)", device, written)
            }
        }
    }
}

/// Shared flag telling sessions to stop after their in-flight command.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mira(path: &str) -> DeviceRef {
        DeviceRef {
            vendor_id: MIRA_VENDOR_ID,
            product_id: MIRA_PRODUCT_ID,
            path: PathBuf::from(path),
            serial: None,
        }
    }

    #[test]
    fn test_device_class() {
        assert_eq!(mira("/dev/hidraw0").class(), DeviceClass::Mira);
        let other = DeviceRef {
            product_id: 0x5021,
            ..mira("/dev/hidraw1")
        };
        assert_eq!(other.class(), DeviceClass::Unknown);
        assert!(DeviceClass::Unknown.settle_delay() > DeviceClass::Mira.settle_delay());
    }

    #[test]
    fn test_device_display() {
        let mut dev = mira("/dev/hidraw3");
        assert_eq!(dev.to_string(), "0416:5020 at /dev/hidraw3");
        dev.serial = Some("A1B2".to_string());
        assert_eq!(dev.to_string(), "0416:5020 at /dev/hidraw3 (serial A1B2)");
    }

    #[test]
    fn test_session_error_display() {
        let err = DeviceSessionError {
            device: mira("/dev/hidraw0"),
            stage: SessionStage::Write(2),
            cause: TransportError::ShortWrite {
                written: 1,
                expected: 3,
            },
        };
        assert_eq!(
            err.to_string(),
            "0416:5020 at /dev/hidraw0: command #3: short write: 1 of 3 bytes"
        );
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
