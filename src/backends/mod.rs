//! Platform backends for `hidlink`.
//!
//! - **`hid`** (feature `hid`, default): enumeration, open, read/write over `hidapi`.
//! - **`linux`**: `hidraw` report descriptor access for usage resolution.
//! - **`windows`**: raw UTF-16 device strings from the HID class driver.
//!
//! The decoders in [`wchar`](crate::wchar) and [`descriptor`](crate::descriptor)
//! never touch a device; everything that does lives here.

#[cfg(feature = "hid")]
#[cfg_attr(docsrs, doc(cfg(feature = "hid")))]
pub mod hid;

#[cfg(target_os = "linux")]
#[cfg_attr(docsrs, doc(cfg(target_os = "linux")))]
pub mod linux;

#[cfg(target_os = "windows")]
#[cfg_attr(docsrs, doc(cfg(target_os = "windows")))]
pub mod windows;

#[cfg(feature = "hid")]
use crate::{config::HidConfig, info::DeviceInfo, wchar::WideCharDecoder};

/// Unified discovery across enabled backends.
///
/// Lists every `hidapi` entry, then lets the platform backend fill what `hidapi`
/// left out:
/// - Linux: unresolved usage page/usage from the hidraw report descriptor
///   (when `config.resolve_usage` is set).
/// - Windows: missing manufacturer/product strings from `HidD_Get*String`.
///
/// `decoder` is only used by the Windows string fallback; `hidapi` strings arrive
/// already decoded.
///
/// Per-device enrichment failures are logged and leave that record as `hidapi`
/// reported it.
#[cfg(feature = "hid")]
pub fn probe_devices(
    api: &hidapi::HidApi,
    config: &HidConfig,
    decoder: &WideCharDecoder,
) -> Vec<DeviceInfo> {
    let mut out = Vec::new();

    for entry in api.device_list() {
        #[allow(unused_mut)]
        let mut info = hid::device_info(entry, config);

        #[cfg(target_os = "windows")]
        {
            if info.manufacturer.is_empty() || info.product.is_empty() {
                info = fill_strings(entry, info, decoder);
            }
        }

        #[cfg(target_os = "linux")]
        {
            if config.resolve_usage {
                resolve_usage(&mut info);
            }
        }

        out.push(info);
    }

    // Only the Windows string fallback decodes; hidapi strings arrive decoded.
    #[cfg(not(target_os = "windows"))]
    let _ = decoder;

    tracing::debug!(count = out.len(), "enumerated HID devices");
    out
}

#[cfg(all(feature = "hid", target_os = "linux"))]
fn resolve_usage(info: &mut DeviceInfo) {
    use crate::usage::UsageResolver;
    use crate::backends::linux::HidrawOpener;

    if info.device_usage().is_resolved() || !HidrawOpener::handles(&info.path) {
        return;
    }
    let resolver = UsageResolver::new(HidrawOpener);
    if let Err(e) = resolver.resolve_into(info) {
        tracing::warn!(path = %info.path, error = %e, "unable to read report descriptor");
    }
}

#[cfg(all(feature = "hid", target_os = "windows"))]
fn fill_strings(
    entry: &hidapi::DeviceInfo,
    info: DeviceInfo,
    decoder: &WideCharDecoder,
) -> DeviceInfo {
    let wide = match windows::query_wide_strings(&info.path) {
        Ok(wide) => wide,
        Err(e) => {
            tracing::debug!(path = %info.path, error = %e, "HidD string query failed");
            return info;
        }
    };
    let raw = crate::info::RawDeviceRecord {
        manufacturer: wide.manufacturer,
        product: wide.product,
        ..hid::raw_record(entry)
    };
    match DeviceInfo::from_raw(&raw, decoder) {
        Ok(decoded) => DeviceInfo {
            manufacturer: if info.manufacturer.is_empty() {
                decoded.manufacturer
            } else {
                info.manufacturer
            },
            product: if info.product.is_empty() {
                decoded.product
            } else {
                info.product
            },
            ..info
        },
        Err(e) => {
            tracing::warn!(path = %info.path, error = %e, "device string rejected");
            info
        }
    }
}
