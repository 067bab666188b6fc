//! `hidapi`-backed device.
//!
//! [`HidapiDevice`] is a [`ReportDevice`] over `hidapi::HidDevice`. Report I/O,
//! the read loop and shutdown live in [`transport`](crate::transport); this module
//! opens the handle and converts enumeration entries.

use std::ffi::CString;

use hidapi::HidApi;
use tracing::debug;

use crate::config::HidConfig;
use crate::error::{Error, Result};
use crate::info::{DeviceInfo, RawDeviceRecord};
use crate::transport::{ReportDevice, Transport};

/// Concrete device implementing [`Device`](crate::Device) over `hidapi`.
pub type HidapiDevice = ReportDevice<hidapi::HidDevice>;

impl Transport for hidapi::HidDevice {
    fn write_report(&self, data: &[u8]) -> Result<usize> {
        Ok(self.write(data)?)
    }

    fn read_report(&self, buf: &mut [u8], timeout_ms: i32) -> Result<usize> {
        Ok(self.read_timeout(buf, timeout_ms)?)
    }
}

/// Open `info.path` through `api`.
pub fn open(api: &HidApi, info: &DeviceInfo, config: &HidConfig) -> Result<HidapiDevice> {
    let path = CString::new(info.path.as_str()).map_err(|_| Error::Open(info.path.clone()))?;
    let raw = api.open_path(&path).map_err(|e| {
        debug!(path = %info.path, error = %e, "hid_open_path failed");
        Error::Open(info.path.clone())
    })?;
    debug!(
        path = %info.path,
        vid = format_args!("{:04x}", info.vendor_id),
        pid = format_args!("{:04x}", info.product_id),
        "opened HID device"
    );
    Ok(ReportDevice::new(raw, info.clone(), config))
}

/// Build a [`DeviceInfo`] from a `hidapi` enumeration entry.
pub fn device_info(info: &hidapi::DeviceInfo, config: &HidConfig) -> DeviceInfo {
    let interface_number = info.interface_number();
    DeviceInfo {
        path: info.path().to_string_lossy().into_owned(),
        vendor_id: info.vendor_id(),
        product_id: info.product_id(),
        version_number: info.release_number(),
        manufacturer: info.manufacturer_string().unwrap_or_default().to_owned(),
        product: info.product_string().unwrap_or_default().to_owned(),
        serial_number: info.serial_number().map(str::to_owned),
        interface_number: (interface_number >= 0).then_some(interface_number),
        usage_page: info.usage_page(),
        usage: info.usage(),
        input_report_length: config.input_report_length,
        output_report_length: config.output_report_length,
    }
}

/// Numeric part of a `hidapi` entry as a [`RawDeviceRecord`]; strings are left empty
/// for the caller to supply in wide form.
pub fn raw_record(info: &hidapi::DeviceInfo) -> RawDeviceRecord {
    RawDeviceRecord {
        path: info.path().to_string_lossy().into_owned(),
        vendor_id: info.vendor_id(),
        product_id: info.product_id(),
        release_number: info.release_number(),
        serial_number: info.serial_number().map(str::to_owned),
        interface_number: info.interface_number(),
        usage_page: info.usage_page(),
        usage: info.usage(),
        manufacturer: None,
        product: None,
    }
}
