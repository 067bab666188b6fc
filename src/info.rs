//! Device descriptor records.
//!
//! [`DeviceInfo`] is the cloneable description of one HID interface produced by
//! enumeration. It is what callers display, filter on, and hand back to
//! [`Manager::open`](crate::Manager::open).
//!
//! [`RawDeviceRecord`] is what an enumerator hands over before string decoding:
//! numeric fields plus manufacturer/product strings still in the platform's
//! wide-character form.
//!
//! # Conventions
//! - `path` is an OS path (hidraw node, IOKit path, Windows interface path). Treat it
//!   as opaque; it may change across ports and reconnects.
//! - `usage_page`/`usage` of `0` mean unknown, see [`DeviceUsage`].
//! - `interface_number` is `None` where the platform reports `-1`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_REPORT_LENGTH;
use crate::descriptor::DeviceUsage;
use crate::error::{Error, Result};
use crate::wchar::WideCharDecoder;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Platform device path, used to open the device.
    pub path: String,

    pub vendor_id: u16,
    pub product_id: u16,

    /// Device release number (bcdDevice on USB).
    pub version_number: u16,

    pub manufacturer: String,
    pub product: String,

    /// Serial number string, if the device reports one.
    pub serial_number: Option<String>,

    /// USB interface index, if applicable.
    pub interface_number: Option<i32>,

    /// HID Usage Page (e.g. `0x01` Generic Desktop), `0` if unknown.
    pub usage_page: u16,

    /// HID Usage within the page (e.g. `0x06` Keyboard), `0` if unknown.
    pub usage: u16,

    /// Size of input reports read from the device.
    pub input_report_length: usize,

    /// Size of output reports written to the device.
    pub output_report_length: usize,
}

impl DeviceInfo {
    /// Decode a raw enumeration record.
    ///
    /// String failures name the offending field, e.g.
    /// `unable to convert manufacturer string: invalid rune at position 3`.
    pub fn from_raw(raw: &RawDeviceRecord, decoder: &WideCharDecoder) -> Result<Self> {
        let manufacturer = decoder
            .decode(raw.manufacturer.as_deref())
            .map_err(|source| Error::Decode {
                field: "manufacturer",
                source,
            })?;
        let product = decoder
            .decode(raw.product.as_deref())
            .map_err(|source| Error::Decode {
                field: "product",
                source,
            })?;

        Ok(Self {
            path: raw.path.clone(),
            vendor_id: raw.vendor_id,
            product_id: raw.product_id,
            version_number: raw.release_number,
            manufacturer,
            product,
            serial_number: raw.serial_number.clone(),
            interface_number: (raw.interface_number >= 0).then_some(raw.interface_number),
            usage_page: raw.usage_page,
            usage: raw.usage,
            input_report_length: DEFAULT_REPORT_LENGTH,
            output_report_length: DEFAULT_REPORT_LENGTH,
        })
    }

    pub fn with_report_lengths(mut self, input: usize, output: usize) -> Self {
        self.input_report_length = input;
        self.output_report_length = output;
        self
    }

    pub fn device_usage(&self) -> DeviceUsage {
        DeviceUsage::new(self.usage_page, self.usage)
    }

    pub fn set_usage(&mut self, usage: DeviceUsage) {
        self.usage_page = usage.usage_page;
        self.usage = usage.usage;
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.product.is_empty() {
            "Unknown"
        } else {
            self.product.as_str()
        };
        write!(
            f,
            "{name} [{:04x}:{:04x}] up=0x{:04x} u=0x{:04x} {}",
            self.vendor_id, self.product_id, self.usage_page, self.usage, self.path
        )
    }
}

/// Enumeration record with undecoded wide strings.
///
/// `manufacturer`/`product` hold native-endian `wchar_t` units (the terminator is
/// optional). `None` means the platform returned no string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawDeviceRecord {
    pub path: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub release_number: u16,
    pub serial_number: Option<String>,
    pub interface_number: i32,
    pub usage_page: u16,
    pub usage: u16,
    pub manufacturer: Option<Vec<u8>>,
    pub product: Option<Vec<u8>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use crate::wchar::WideWidth;

    fn wide32(s: &str) -> Vec<u8> {
        s.chars()
            .map(u32::from)
            .chain(std::iter::once(0))
            .flat_map(u32::to_ne_bytes)
            .collect()
    }

    fn record() -> RawDeviceRecord {
        RawDeviceRecord {
            path: "/dev/hidraw3".into(),
            vendor_id: 0x046d,
            product_id: 0xc52b,
            release_number: 0x1201,
            serial_number: None,
            interface_number: 2,
            usage_page: 0xff00,
            usage: 0x0001,
            manufacturer: Some(wide32("Logitech")),
            product: Some(wide32("USB Receiver")),
        }
    }

    #[test]
    fn decodes_strings_and_copies_ids() {
        let dec = WideCharDecoder::with_width(WideWidth::Four);
        let info = DeviceInfo::from_raw(&record(), &dec).unwrap();
        assert_eq!(info.manufacturer, "Logitech");
        assert_eq!(info.product, "USB Receiver");
        assert_eq!(info.vendor_id, 0x046d);
        assert_eq!(info.version_number, 0x1201);
        assert_eq!(info.interface_number, Some(2));
        assert_eq!(info.device_usage(), DeviceUsage::new(0xff00, 1));
        assert_eq!(info.input_report_length, 64);
        assert_eq!(info.output_report_length, 64);
    }

    #[test]
    fn missing_strings_are_empty() {
        let raw = RawDeviceRecord {
            manufacturer: None,
            product: None,
            interface_number: -1,
            ..record()
        };
        let info = DeviceInfo::from_raw(&raw, &WideCharDecoder::with_width(WideWidth::Four)).unwrap();
        assert_eq!(info.manufacturer, "");
        assert_eq!(info.product, "");
        assert_eq!(info.interface_number, None);
    }

    #[test]
    fn decode_failure_names_the_field() {
        let mut product = 0xD800u32.to_ne_bytes().to_vec();
        product.extend(wide32("ok"));
        let raw = RawDeviceRecord {
            product: Some(product),
            ..record()
        };
        let err = DeviceInfo::from_raw(&raw, &WideCharDecoder::with_width(WideWidth::Four)).unwrap_err();
        match err {
            Error::Decode { field, source } => {
                assert_eq!(field, "product");
                assert_eq!(source, DecodeError::InvalidRune(1));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            DeviceInfo::from_raw(&raw, &WideCharDecoder::with_width(WideWidth::Four))
                .unwrap_err()
                .to_string(),
            "unable to convert product string: invalid rune at position 1"
        );
    }

    #[test]
    fn serializes_to_json() {
        let info = DeviceInfo::from_raw(&record(), &WideCharDecoder::with_width(WideWidth::Four))
            .unwrap()
            .with_report_lengths(65, 33);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["path"], "/dev/hidraw3");
        assert_eq!(json["usage_page"], 0xff00);
        assert_eq!(json["input_report_length"], 65);
        let back: DeviceInfo = serde_json::from_value(json).unwrap();
        assert_eq!(back, info);
    }

    #[test]
    fn display_includes_ids_and_usage() {
        let mut info = DeviceInfo::from_raw(&record(), &WideCharDecoder::with_width(WideWidth::Four)).unwrap();
        info.set_usage(DeviceUsage::new(1, 6));
        assert_eq!(
            info.to_string(),
            "USB Receiver [046d:c52b] up=0x0001 u=0x0006 /dev/hidraw3"
        );
    }
}
