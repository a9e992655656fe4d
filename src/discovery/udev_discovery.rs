use super::{DeviceDiscovery, DiscoveryError};
use crate::session::DeviceRef;
use std::path::PathBuf;

pub struct UdevDiscovery;

/// Parse a HID_ID property ("BBBB:VVVVVVVV:PPPPPPPP", hex) into vendor and product.
fn parse_hid_id(hid_id: &str) -> Option<(u16, u16)> {
    let mut parts = hid_id.split(':');
    let _bus = parts.next()?;
    let vendor = u32::from_str_radix(parts.next()?, 16).ok()?;
    let product = u32::from_str_radix(parts.next()?, 16).ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((u16::try_from(vendor).ok()?, u16::try_from(product).ok()?))
}

impl DeviceDiscovery for UdevDiscovery {
    fn find_panels(vendor_id: u16, product_id: u16) -> Result<Vec<DeviceRef>, DiscoveryError> {
        let mut enumerator =
            udev::Enumerator::new().map_err(|e| DiscoveryError::Enumeration(e.to_string()))?;

        enumerator
            .match_subsystem("hidraw")
            .map_err(|e| DiscoveryError::Enumeration(e.to_string()))?;

        let mut results = Vec::new();

        for device in enumerator
            .scan_devices()
            .map_err(|e| DiscoveryError::Enumeration(e.to_string()))?
        {
            let Some(devnode) = device.devnode() else {
                continue;
            };

            // HID_ID and HID_UNIQ live on the parent in the "hid" subsystem
            let hid = match device.parent_with_subsystem("hid") {
                Ok(Some(parent)) => parent,
                _ => continue,
            };

            let ids = hid
                .property_value("HID_ID")
                .and_then(|v| v.to_str())
                .and_then(parse_hid_id);
            if ids != Some((vendor_id, product_id)) {
                continue;
            }

            let serial = hid
                .property_value("HID_UNIQ")
                .and_then(|v| v.to_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string);

            results.push(DeviceRef {
                vendor_id,
                product_id,
                path: PathBuf::from(devnode),
                serial,
            });
        }

        if results.is_empty() {
            Err(DiscoveryError::NotFound {
                vendor_id,
                product_id,
            })
        } else {
            results.sort_by(|a, b| a.path.cmp(&b.path));
            Ok(results)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hid_id() {
        assert_eq!(parse_hid_id("0003:00000416:00005020"), Some((0x0416, 0x5020)));
    }

    #[test]
    fn test_parse_hid_id_rejects_garbage() {
        assert_eq!(parse_hid_id(""), None);
        assert_eq!(parse_hid_id("0003:00000416"), None);
        assert_eq!(parse_hid_id("0003:zzzz:5020"), None);
        assert_eq!(parse_hid_id("0003:00010416:00005020"), None);
        assert_eq!(parse_hid_id("0003:00000416:00005020:01"), None);
    }
}
