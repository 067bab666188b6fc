//! Usage resolution from a device's raw report descriptor.
//!
//! [`UsageResolver`] ties [`parse_report_descriptor`] to the OS: it opens a
//! device's control path, asks for the descriptor size, fetches that many
//! descriptor bytes, and parses them into a [`DeviceUsage`].
//!
//! The OS side is a collaborator behind two traits:
//! - [`ControlOpener`] opens a path and hands back a handle.
//! - [`ControlHandle`] answers the two descriptor queries.
//!
//! Handles are released by `Drop`. Every return path out of
//! [`UsageResolver::resolve`] drops the handle before the caller sees the result,
//! including the error paths.
//!
//! ## Outcomes
//! - Permission denied at open: `Ok(DeviceUsage::UNKNOWN)`. Unprivileged users
//!   commonly cannot open every hidraw node; that is not a failure.
//! - Any other open or query failure: `Err`, propagated.
//! - A malformed or truncated descriptor: best-effort usage, possibly unknown.

use std::io;

use thiserror::Error;
use tracing::{debug, trace};

use crate::descriptor::{parse_report_descriptor, DeviceUsage};
use crate::error::Result;
use crate::info::DeviceInfo;

/// Failure to open a control path.
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("permission denied")]
    PermissionDenied,

    #[error(transparent)]
    Io(io::Error),
}

impl From<io::Error> for OpenError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::PermissionDenied {
            OpenError::PermissionDenied
        } else {
            OpenError::Io(err)
        }
    }
}

/// An open device that can report its raw HID report descriptor.
///
/// Implementations release the OS handle in `Drop`.
pub trait ControlHandle {
    /// Size of the report descriptor in bytes.
    fn descriptor_size(&mut self) -> io::Result<usize>;

    /// The first `size` bytes of the report descriptor.
    fn descriptor_bytes(&mut self, size: usize) -> io::Result<Vec<u8>>;
}

/// Opens device control paths.
pub trait ControlOpener {
    type Handle: ControlHandle;

    fn open_control_path(&self, path: &str) -> std::result::Result<Self::Handle, OpenError>;
}

#[derive(Debug, Clone, Default)]
pub struct UsageResolver<O> {
    opener: O,
}

impl<O: ControlOpener> UsageResolver<O> {
    pub fn new(opener: O) -> Self {
        Self { opener }
    }

    pub fn opener(&self) -> &O {
        &self.opener
    }

    /// Read and classify the report descriptor behind `path`.
    pub fn resolve(&self, path: &str) -> Result<DeviceUsage> {
        let mut handle = match self.opener.open_control_path(path) {
            Ok(handle) => handle,
            Err(OpenError::PermissionDenied) => {
                debug!(path, "no permission to read report descriptor; usage unknown");
                return Ok(DeviceUsage::UNKNOWN);
            }
            Err(OpenError::Io(err)) => return Err(err.into()),
        };

        let size = handle.descriptor_size()?;
        let bytes = handle.descriptor_bytes(size)?;
        let usage = parse_report_descriptor(&bytes);
        trace!(
            path,
            size,
            usage_page = usage.usage_page,
            usage = usage.usage,
            "parsed report descriptor"
        );
        Ok(usage)
    }

    /// Resolve and store the usage into `info`.
    ///
    /// On error `info` is left untouched.
    pub fn resolve_into(&self, info: &mut DeviceInfo) -> Result<()> {
        let usage = self.resolve(&info.path)?;
        info.set_usage(usage);
        Ok(())
    }
}
