//! HID report descriptor usage extraction.
//!
//! A report descriptor is a stream of *short items* (HID 1.11, section 6.2.2.2):
//! a 1-byte prefix `tag:4 | type:2 | size:2` followed by 0, 1, 2 or 4 little-endian
//! data bytes. A size code of `3` means four data bytes.
//!
//! This module only classifies a device. It walks the item stream and records the
//! first Global *Usage Page* (type 1, tag 0) and the first Local *Usage* (type 2,
//! tag 0), stopping as soon as both are known. Collections, report IDs, field
//! layout, units and ranges are consumed and ignored.
//!
//! ## Zero means unset
//! A Usage Page or Usage whose low 16 bits are `0` is never recorded. A descriptor
//! that declares `USAGE_PAGE (0)` followed later by `USAGE_PAGE (5)` resolves to
//! page 5. Descriptors that legitimately declare usage 0 therefore report "unknown".
//!
//! ## Malformed input
//! A truncated item ends the walk. [`parse_report_descriptor`] never fails and never
//! reads past the slice; it returns whatever was resolved before the truncation.

use core::num::NonZeroU16;
use core::ops::ControlFlow;

use serde::{Deserialize, Serialize};

/// Item type, bits 2–3 of the prefix byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    Main,
    Global,
    Local,
    Reserved,
}

impl ItemType {
    fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => ItemType::Main,
            1 => ItemType::Global,
            2 => ItemType::Local,
            _ => ItemType::Reserved,
        }
    }
}

/// One decoded short item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorItem {
    /// Data length in bytes: 0, 1, 2 or 4.
    pub size: u8,
    pub item_type: ItemType,
    /// Tag, bits 4–7 of the prefix byte.
    pub tag: u8,
    /// Data bytes as a little-endian unsigned integer.
    pub value: u32,
}

impl DescriptorItem {
    pub const USAGE_PAGE_TAG: u8 = 0x0;
    pub const USAGE_TAG: u8 = 0x0;

    pub fn is_usage_page(&self) -> bool {
        self.item_type == ItemType::Global && self.tag == Self::USAGE_PAGE_TAG
    }

    pub fn is_usage(&self) -> bool {
        self.item_type == ItemType::Local && self.tag == Self::USAGE_TAG
    }
}

/// Iterator over the short items of a report descriptor.
///
/// Ends at the end of the slice or at the first item whose data is truncated.
#[derive(Debug, Clone)]
pub struct DescriptorItems<'a> {
    rest: &'a [u8],
}

impl<'a> DescriptorItems<'a> {
    pub fn new(descriptor: &'a [u8]) -> Self {
        Self { rest: descriptor }
    }
}

impl<'a> Iterator for DescriptorItems<'a> {
    type Item = DescriptorItem;

    fn next(&mut self) -> Option<Self::Item> {
        let (&prefix, tail) = self.rest.split_first()?;

        let size: u8 = match prefix & 0x03 {
            3 => 4,
            n => n,
        };
        let item_type = ItemType::from_bits(prefix >> 2);
        let tag = (prefix >> 4) & 0x0F;

        if tail.len() < usize::from(size) {
            self.rest = &[];
            return None;
        }
        let (data, rest) = tail.split_at(usize::from(size));
        self.rest = rest;

        let value = data
            .iter()
            .rev()
            .fold(0u32, |acc, &b| (acc << 8) | u32::from(b));

        Some(DescriptorItem {
            size,
            item_type,
            tag,
            value,
        })
    }
}

/// Device classification: `(usage_page, usage)`.
///
/// `0` means unknown/unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceUsage {
    pub usage_page: u16,
    pub usage: u16,
}

impl DeviceUsage {
    pub const UNKNOWN: DeviceUsage = DeviceUsage {
        usage_page: 0,
        usage: 0,
    };

    pub fn new(usage_page: u16, usage: u16) -> Self {
        Self { usage_page, usage }
    }

    /// Both page and usage are known.
    pub fn is_resolved(&self) -> bool {
        self.usage_page != 0 && self.usage != 0
    }

    /// Vendor-defined usage page (`0xFF00..=0xFFFF`).
    pub fn is_vendor_defined(&self) -> bool {
        self.usage_page & 0xFF00 == 0xFF00
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct UsageScan {
    usage_page: Option<NonZeroU16>,
    usage: Option<NonZeroU16>,
}

impl UsageScan {
    fn accept(mut self, item: &DescriptorItem) -> Self {
        // Truncation to 16 bits happens before the zero check.
        let low = item.value as u16;
        if item.is_usage_page() && self.usage_page.is_none() {
            self.usage_page = NonZeroU16::new(low);
        } else if item.is_usage() && self.usage.is_none() {
            self.usage = NonZeroU16::new(low);
        }
        self
    }

    fn is_complete(&self) -> bool {
        self.usage_page.is_some() && self.usage.is_some()
    }
}

impl From<UsageScan> for DeviceUsage {
    fn from(scan: UsageScan) -> Self {
        DeviceUsage {
            usage_page: scan.usage_page.map_or(0, NonZeroU16::get),
            usage: scan.usage.map_or(0, NonZeroU16::get),
        }
    }
}

/// Extract the first Usage Page and Usage declared by a report descriptor.
pub fn parse_report_descriptor(descriptor: &[u8]) -> DeviceUsage {
    let walk = DescriptorItems::new(descriptor).try_fold(UsageScan::default(), |scan, item| {
        let scan = scan.accept(&item);
        if scan.is_complete() {
            ControlFlow::Break(scan)
        } else {
            ControlFlow::Continue(scan)
        }
    });
    let (ControlFlow::Break(scan) | ControlFlow::Continue(scan)) = walk;
    scan.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rustfmt::skip]
    static KEYBOARD: &[u8] = &[
        0x05, 0x01,       // USAGE_PAGE (Generic Desktop)
        0x09, 0x06,       // USAGE (Keyboard)
        0xa1, 0x01,       // COLLECTION (Application)
        0x05, 0x07,       //   USAGE_PAGE (Keyboard)
        0x19, 0xe0,       //   USAGE_MINIMUM (Left Control)
        0x29, 0xe7,       //   USAGE_MAXIMUM (Right GUI)
        0x15, 0x00,       //   LOGICAL_MINIMUM (0)
        0x25, 0x01,       //   LOGICAL_MAXIMUM (1)
        0x75, 0x01,       //   REPORT_SIZE (1)
        0x95, 0x08,       //   REPORT_COUNT (8)
        0x81, 0x02,       //   INPUT (Data,Var,Abs)
        0xc0,             // END_COLLECTION
    ];

    #[rustfmt::skip]
    static VENDOR: &[u8] = &[
        0x06, 0x00, 0xff, // USAGE_PAGE (Vendor Defined 0xFF00)
        0x09, 0x01,       // USAGE (Vendor Usage 1)
        0xa1, 0x01,       // COLLECTION (Application)
        0x15, 0x00,       //   LOGICAL_MINIMUM (0)
        0x26, 0xff, 0x00, //   LOGICAL_MAXIMUM (255)
        0x75, 0x08,       //   REPORT_SIZE (8)
        0x95, 0x40,       //   REPORT_COUNT (64)
        0x09, 0x01,       //   USAGE (Vendor Usage 1)
        0x81, 0x02,       //   INPUT (Data,Var,Abs)
        0xc0,             // END_COLLECTION
    ];

    #[test]
    fn page_then_usage() {
        let got = parse_report_descriptor(&[0x05, 0x01, 0x09, 0x02]);
        assert_eq!(got, DeviceUsage::new(1, 2));
    }

    #[test]
    fn keyboard_descriptor() {
        assert_eq!(parse_report_descriptor(KEYBOARD), DeviceUsage::new(0x01, 0x06));
    }

    #[test]
    fn vendor_descriptor_two_byte_page() {
        let got = parse_report_descriptor(VENDOR);
        assert_eq!(got, DeviceUsage::new(0xff00, 0x01));
        assert!(got.is_vendor_defined());
    }

    #[test]
    fn empty_descriptor() {
        assert_eq!(parse_report_descriptor(&[]), DeviceUsage::UNKNOWN);
    }

    #[test]
    fn every_truncation_is_safe() {
        for cut in 0..KEYBOARD.len() {
            let got = parse_report_descriptor(&KEYBOARD[..cut]);
            let expected = match cut {
                0 | 1 => DeviceUsage::UNKNOWN,
                2 | 3 => DeviceUsage::new(0x01, 0),
                _ => DeviceUsage::new(0x01, 0x06),
            };
            assert_eq!(got, expected, "cut at {cut}");
        }
    }

    #[test]
    fn truncated_item_keeps_earlier_result() {
        // Usage item announces two data bytes but only one is present.
        let got = parse_report_descriptor(&[0x05, 0x0d, 0x0a, 0x02]);
        assert_eq!(got, DeviceUsage::new(0x0d, 0));
    }

    #[test]
    fn size_code_three_means_four_bytes() {
        // 0x07: Global, tag 0, size code 3.
        let got = parse_report_descriptor(&[0x07, 0x01, 0x00, 0x00, 0x00, 0x09, 0x05]);
        assert_eq!(got, DeviceUsage::new(1, 5));

        // Three data bytes are not enough for a size-code-3 item.
        let got = parse_report_descriptor(&[0x07, 0x01, 0x00, 0x00]);
        assert_eq!(got, DeviceUsage::UNKNOWN);
    }

    #[test]
    fn value_is_truncated_to_low_sixteen_bits() {
        let got = parse_report_descriptor(&[0x07, 0x0c, 0x00, 0x01, 0x00, 0x0b, 0x01, 0x00, 0x0c, 0x00]);
        assert_eq!(got, DeviceUsage::new(0x000c, 0x0001));
    }

    #[test]
    fn zero_page_does_not_count_as_set() {
        #[rustfmt::skip]
        let desc = [
            0x05, 0x00, // USAGE_PAGE (0)
            0x09, 0x01, // USAGE (1)
            0x05, 0x05, // USAGE_PAGE (Game Controls)
        ];
        assert_eq!(parse_report_descriptor(&desc), DeviceUsage::new(5, 1));
    }

    #[test]
    fn page_with_zero_low_bits_does_not_count_as_set() {
        // 0x0001_0000 truncates to 0.
        let desc = [0x07, 0x00, 0x00, 0x01, 0x00, 0x09, 0x02, 0x05, 0x03];
        assert_eq!(parse_report_descriptor(&desc), DeviceUsage::new(3, 2));
    }

    #[test]
    fn stops_once_both_are_known() {
        #[rustfmt::skip]
        let desc = [
            0x05, 0x01, // USAGE_PAGE (Generic Desktop)
            0x09, 0x05, // USAGE (Game Pad)
            0x05, 0x09, // USAGE_PAGE (Button), must be ignored
            0x09, 0x30, // USAGE (X), must be ignored
        ];
        assert_eq!(parse_report_descriptor(&desc), DeviceUsage::new(0x01, 0x05));
    }

    #[test]
    fn later_usage_does_not_overwrite_first() {
        #[rustfmt::skip]
        let desc = [
            0x09, 0x04, // USAGE (Joystick) before the page
            0x09, 0x05, // USAGE (Game Pad)
            0x05, 0x01, // USAGE_PAGE (Generic Desktop)
        ];
        assert_eq!(parse_report_descriptor(&desc), DeviceUsage::new(0x01, 0x04));
    }

    #[test]
    fn other_items_are_skipped() {
        #[rustfmt::skip]
        let desc = [
            0xa1, 0x01,       // COLLECTION (Application), Main tag 0xa
            0x85, 0x01,       // REPORT_ID (1), Global tag 8
            0x19, 0x01,       // USAGE_MINIMUM, Local tag 1
            0x00,             // Main tag 0, no data
            0x0f, 0x00, 0x00, 0x00, 0x00, // Reserved tag 0, four bytes
            0x05, 0x0f,       // USAGE_PAGE (Physical Interface)
            0x09, 0x21,       // USAGE
        ];
        assert_eq!(parse_report_descriptor(&desc), DeviceUsage::new(0x0f, 0x21));
    }

    #[test]
    fn tokenizer_yields_items() {
        let items: Vec<DescriptorItem> = DescriptorItems::new(&[0x06, 0x00, 0xff, 0xc0, 0x27, 0xff, 0xff, 0x00, 0x00]).collect();
        assert_eq!(
            items,
            vec![
                DescriptorItem { size: 2, item_type: ItemType::Global, tag: 0, value: 0xff00 },
                DescriptorItem { size: 0, item_type: ItemType::Main, tag: 0xc, value: 0 },
                DescriptorItem { size: 4, item_type: ItemType::Global, tag: 2, value: 0x0000_ffff },
            ]
        );
    }

    #[test]
    fn tokenizer_stops_on_truncation() {
        let mut items = DescriptorItems::new(&[0x09, 0x01, 0x26, 0xff]);
        assert!(items.next().is_some());
        assert_eq!(items.next(), None);
        assert_eq!(items.next(), None);
    }
}
