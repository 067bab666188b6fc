//! Library configuration.
//!
//! [`HidConfig`] is plain serde data, usually loaded from TOML. Every key is
//! optional; missing keys take the defaults below.
//!
//! ```toml
//! # wchar_t width override in bytes (2 or 4). Omit to use the platform width.
//! wide_width = 4
//! input_report_length = 64
//! output_report_length = 64
//! read_channel_capacity = 30
//! read_timeout_ms = 100
//! resolve_usage = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::wchar::WideCharDecoder;

/// Default size of a raw HID report, in bytes.
pub const DEFAULT_REPORT_LENGTH: usize = 64;

/// Default number of input reports buffered by a device's read loop.
pub const DEFAULT_READ_CHANNEL_CAPACITY: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HidConfig {
    /// `wchar_t` width in bytes. `None` selects the compilation target's width.
    ///
    /// `hidapi` hands over strings already decoded, so this only affects
    /// [`DeviceInfo::from_raw`](crate::DeviceInfo::from_raw) callers and, on
    /// Windows, the `HidD_Get*String` fallback used during enumeration.
    pub wide_width: Option<usize>,

    /// Buffer size for input reports read from a device.
    pub input_report_length: usize,

    /// Advertised maximum output report size.
    pub output_report_length: usize,

    /// Bounded capacity of the per-device read channel.
    pub read_channel_capacity: usize,

    /// Read-loop poll interval. The loop checks for shutdown between reads.
    pub read_timeout_ms: u32,

    /// On Linux, fill unresolved usage page/usage from the hidraw report descriptor.
    pub resolve_usage: bool,
}

impl Default for HidConfig {
    fn default() -> Self {
        Self {
            wide_width: None,
            input_report_length: DEFAULT_REPORT_LENGTH,
            output_report_length: DEFAULT_REPORT_LENGTH,
            read_channel_capacity: DEFAULT_READ_CHANNEL_CAPACITY,
            read_timeout_ms: 100,
            resolve_usage: true,
        }
    }
}

impl HidConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Build the wide-string decoder this configuration asks for.
    ///
    /// Fails with [`Error::UnsupportedWideWidth`](crate::Error::UnsupportedWideWidth)
    /// when `wide_width` is neither 2 nor 4.
    pub fn decoder(&self) -> Result<WideCharDecoder> {
        match self.wide_width {
            Some(bytes) => WideCharDecoder::new(bytes),
            None => Ok(WideCharDecoder::native()),
        }
    }
}
