//! Entry point for device access.
//!
//! [`Manager`] owns the `hidapi` context, the [`HidConfig`] and the
//! [`WideCharDecoder`] chosen for this platform. It lists devices, finds one by
//! path, and opens it.
//!
//! # Example
//! ```no_run
//! use hidlink::Manager;
//!
//! let mgr = Manager::new().expect("init hidapi");
//! for info in mgr.devices() {
//!     println!("{info}");
//! }
//! ```

use tracing::debug;

use crate::backends::hid::{self, HidapiDevice};
use crate::backends::probe_devices;
use crate::config::HidConfig;
use crate::error::Result;
use crate::info::DeviceInfo;
use crate::wchar::WideCharDecoder;

pub struct Manager {
    api: hidapi::HidApi,
    config: HidConfig,
    decoder: WideCharDecoder,
}

impl Manager {
    /// Initialise with the default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(HidConfig::default())
    }

    /// Initialise with `config`.
    ///
    /// Fails before touching `hidapi` if the configured wide-character width is
    /// unsupported.
    pub fn with_config(config: HidConfig) -> Result<Self> {
        let decoder = config.decoder()?;
        let api = hidapi::HidApi::new()?;
        debug!(wide_width = decoder.width().bytes(), "HID API initialised");
        Ok(Self {
            api,
            config,
            decoder,
        })
    }

    pub fn config(&self) -> &HidConfig {
        &self.config
    }

    pub fn decoder(&self) -> &WideCharDecoder {
        &self.decoder
    }

    /// Re-scan the system for devices.
    pub fn refresh(&mut self) -> Result<()> {
        self.api.refresh_devices()?;
        Ok(())
    }

    /// All HID interfaces seen by the last scan.
    pub fn devices(&self) -> Vec<DeviceInfo> {
        probe_devices(&self.api, &self.config, &self.decoder)
    }

    /// The device at `path`, or `None` if no enumerated device matches.
    pub fn by_path(&self, path: &str) -> Option<DeviceInfo> {
        self.devices().into_iter().find(|d| d.path == path)
    }

    /// Open a previously enumerated device.
    pub fn open(&self, info: &DeviceInfo) -> Result<HidapiDevice> {
        hid::open(&self.api, info, &self.config)
    }
}
