use super::{DeviceDiscovery, DiscoveryError};
use crate::session::DeviceRef;
use std::path::PathBuf;
use windows::core::PCWSTR;
use windows::Win32::Devices::DeviceAndDriverInstallation::*;
use windows::Win32::Devices::HumanInterfaceDevice::*;
use windows::Win32::Foundation::*;
use windows::Win32::Storage::FileSystem::*;

pub struct WindowsDiscovery;

impl DeviceDiscovery for WindowsDiscovery {
    fn find_panels(vendor_id: u16, product_id: u16) -> Result<Vec<DeviceRef>, DiscoveryError> {
        unsafe { find_panels_inner(vendor_id, product_id) }
    }
}

unsafe fn find_panels_inner(
    vendor_id: u16,
    product_id: u16,
) -> Result<Vec<DeviceRef>, DiscoveryError> {
    let hid_guid = HidD_GetHidGuid();

    let dev_info = SetupDiGetClassDevsW(
        Some(&hid_guid),
        PCWSTR::null(),
        None,
        DIGCF_PRESENT | DIGCF_DEVICEINTERFACE,
    )
    .map_err(|e| DiscoveryError::Enumeration(format!("SetupDiGetClassDevsW: {}", e)))?;

    let mut results = Vec::new();
    let mut index = 0u32;

    loop {
        let mut interface_data = SP_DEVICE_INTERFACE_DATA {
            cbSize: std::mem::size_of::<SP_DEVICE_INTERFACE_DATA>() as u32,
            ..Default::default()
        };

        if SetupDiEnumDeviceInterfaces(dev_info, None, &hid_guid, index, &mut interface_data)
            .is_err()
        {
            break;
        }

        if let Some(device) = get_panel_info(dev_info, &mut interface_data, vendor_id, product_id)
        {
            results.push(device);
        }

        index += 1;
    }

    let _ = SetupDiDestroyDeviceInfoList(dev_info);

    if results.is_empty() {
        Err(DiscoveryError::NotFound {
            vendor_id,
            product_id,
        })
    } else {
        Ok(results)
    }
}

unsafe fn get_panel_info(
    dev_info: HDEVINFO,
    interface_data: &mut SP_DEVICE_INTERFACE_DATA,
    vendor_id: u16,
    product_id: u16,
) -> Option<DeviceRef> {
    // First call: get required size
    let mut required_size = 0u32;
    let _ = SetupDiGetDeviceInterfaceDetailW(
        dev_info,
        interface_data,
        None,
        0,
        Some(&mut required_size),
        None,
    );

    if required_size == 0 {
        return None;
    }

    let mut buf = vec![0u8; required_size as usize];
    let detail = buf.as_mut_ptr() as *mut SP_DEVICE_INTERFACE_DETAIL_DATA_W;
    // cbSize is the size of the fixed part of the struct, not the buffer
    (*detail).cbSize = std::mem::size_of::<SP_DEVICE_INTERFACE_DETAIL_DATA_W>() as u32;

    if SetupDiGetDeviceInterfaceDetailW(
        dev_info,
        interface_data,
        Some(detail),
        required_size,
        None,
        None,
    )
    .is_err()
    {
        return None;
    }

    let device_path = pcwstr_to_string(&(*detail).DevicePath as *const u16);

    // Attribute queries need no access rights
    let wide_path: Vec<u16> = device_path
        .encode_utf16()
        .chain(std::iter::once(0))
        .collect();
    let handle = CreateFileW(
        PCWSTR(wide_path.as_ptr()),
        0,
        FILE_SHARE_READ | FILE_SHARE_WRITE,
        None,
        OPEN_EXISTING,
        FILE_FLAGS_AND_ATTRIBUTES(0),
        None,
    )
    .ok()?;

    let mut attributes = HIDD_ATTRIBUTES {
        Size: std::mem::size_of::<HIDD_ATTRIBUTES>() as u32,
        ..Default::default()
    };
    let is_panel = HidD_GetAttributes(handle, &mut attributes)
        && attributes.VendorID == vendor_id
        && attributes.ProductID == product_id;

    let serial = if is_panel {
        let mut serial_buf = [0u16; 128];
        if HidD_GetSerialNumberString(
            handle,
            serial_buf.as_mut_ptr() as *mut std::ffi::c_void,
            std::mem::size_of_val(&serial_buf) as u32,
        ) {
            Some(pcwstr_to_string(serial_buf.as_ptr())).filter(|s| !s.is_empty())
        } else {
            None
        }
    } else {
        None
    };

    let _ = CloseHandle(handle);

    if is_panel {
        Some(DeviceRef {
            vendor_id,
            product_id,
            path: PathBuf::from(&device_path),
            serial,
        })
    } else {
        None
    }
}

unsafe fn pcwstr_to_string(ptr: *const u16) -> String {
    let mut len = 0;
    while *ptr.add(len) != 0 {
        len += 1;
    }
    String::from_utf16_lossy(std::slice::from_raw_parts(ptr, len))
}
