#[cfg(target_os = "linux")]
pub mod udev_discovery;
#[cfg(target_os = "windows")]
pub mod windows_discovery;

use crate::session::DeviceRef;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("device enumeration failed: {0}")]
    Enumeration(String),
    #[error("no panels with id {vendor_id:04x}:{product_id:04x} found")]
    NotFound { vendor_id: u16, product_id: u16 },
}

pub trait DeviceDiscovery {
    /// Every attached panel matching the id, in enumeration order.
    fn find_panels(vendor_id: u16, product_id: u16) -> Result<Vec<DeviceRef>, DiscoveryError>;
}
