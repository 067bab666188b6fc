//! hidlink — low-level HID device access for Rust.
//!
//! Enumerate HID interfaces, open one by path, and exchange fixed-size reports.
//! Alongside the device plumbing sit two pure decoders:
//! - [`wchar`]: platform wide-character (`wchar_t`) strings to UTF-8
//! - [`descriptor`]: the Usage Page/Usage a HID report descriptor declares
//!
//! and [`usage`], which reads a device's descriptor through an OS collaborator
//! and classifies it.
//!
//! # Feature flags
//! - **`hid`** (default): `hidapi` backend, [`Manager`] and [`Device`] implementations.
//!   Without it the crate is the decoders plus the usage resolver.

pub mod backends;
pub mod config;
pub mod descriptor;
pub mod device;
pub mod error;
pub mod info;
#[cfg(feature = "hid")]
pub mod manager;
pub mod transport;
pub mod usage;
pub mod wchar;

pub use config::HidConfig;
pub use descriptor::{parse_report_descriptor, DeviceUsage};
pub use device::Device;
pub use error::{DecodeError, Error, Result};
pub use info::{DeviceInfo, RawDeviceRecord};
#[cfg(feature = "hid")]
pub use manager::Manager;
pub use transport::{ReportDevice, Transport};
pub use usage::{ControlHandle, ControlOpener, OpenError, UsageResolver};
pub use wchar::{WideCharDecoder, WideWidth};
