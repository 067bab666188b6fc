//! `hidraw` report descriptor access.
//!
//! Opens `/dev/hidrawN` read/write and issues the two descriptor ioctls from
//! `<linux/hidraw.h>`:
//! - `HIDIOCGRDESCSIZE` = `_IOR('H', 0x01, int)`
//! - `HIDIOCGRDESC` = `_IOR('H', 0x02, struct hidraw_report_descriptor)`
//!
//! The handle is a [`File`]; closing happens when it drops.

#![cfg(target_os = "linux")]

use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::AsRawFd;

use nix::ioctl_read;
use nix::libc::c_int;

use crate::usage::{ControlHandle, ControlOpener, OpenError};

/// `HID_MAX_DESCRIPTOR_SIZE` from `<linux/hid.h>`.
pub const HID_MAX_DESCRIPTOR_SIZE: usize = 4096;

/// `struct hidraw_report_descriptor`.
#[repr(C)]
struct HidrawReportDescriptor {
    size: u32,
    value: [u8; HID_MAX_DESCRIPTOR_SIZE],
}

ioctl_read!(hid_read_descriptor_size, b'H', 0x01, c_int);
ioctl_read!(hid_read_descriptor, b'H', 0x02, HidrawReportDescriptor);

/// Opens hidraw nodes for descriptor queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct HidrawOpener;

impl HidrawOpener {
    /// Whether `path` looks like a hidraw node this opener can serve.
    pub fn handles(path: &str) -> bool {
        path.starts_with("/dev/hidraw")
    }
}

impl ControlOpener for HidrawOpener {
    type Handle = HidrawHandle;

    fn open_control_path(&self, path: &str) -> Result<HidrawHandle, OpenError> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(HidrawHandle { file })
    }
}

/// An open hidraw node.
#[derive(Debug)]
pub struct HidrawHandle {
    file: File,
}

impl ControlHandle for HidrawHandle {
    fn descriptor_size(&mut self) -> io::Result<usize> {
        let mut size: c_int = 0;
        // SAFETY: the fd is open for the lifetime of `self.file` and `size` is a
        // valid out-pointer for the ioctl's declared argument type.
        unsafe { hid_read_descriptor_size(self.file.as_raw_fd(), &mut size) }
            .map_err(io::Error::from)?;
        usize::try_from(size).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("negative report descriptor size {size}"),
            )
        })
    }

    fn descriptor_bytes(&mut self, size: usize) -> io::Result<Vec<u8>> {
        let size = size.min(HID_MAX_DESCRIPTOR_SIZE);
        let mut desc = Box::new(HidrawReportDescriptor {
            size: size as u32,
            value: [0; HID_MAX_DESCRIPTOR_SIZE],
        });
        // SAFETY: `desc` is a live, properly laid out `hidraw_report_descriptor`.
        unsafe { hid_read_descriptor(self.file.as_raw_fd(), &mut *desc) }
            .map_err(io::Error::from)?;
        Ok(desc.value[..size].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_hidraw_paths() {
        assert!(HidrawOpener::handles("/dev/hidraw0"));
        assert!(HidrawOpener::handles("/dev/hidraw12"));
        assert!(!HidrawOpener::handles("1-1.4:1.0"));
        assert!(!HidrawOpener::handles("/dev/input/event3"));
    }

    #[test]
    fn missing_node_is_an_io_error() {
        let err = HidrawOpener
            .open_control_path("/dev/hidraw-does-not-exist")
            .unwrap_err();
        assert!(matches!(err, OpenError::Io(ref e) if e.kind() == io::ErrorKind::NotFound));
    }

    #[test]
    fn descriptor_struct_matches_kernel_layout() {
        assert_eq!(
            std::mem::size_of::<HidrawReportDescriptor>(),
            4 + HID_MAX_DESCRIPTOR_SIZE
        );
    }
}
