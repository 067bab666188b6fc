#![cfg(target_os = "windows")]

//! Device strings from the HID class driver.
//!
//! Opens the interface path with zero access rights (enough for `HidD_*` queries,
//! and works for keyboards and mice that Windows opens exclusively) and asks for
//! the manufacturer, product and serial strings. Results stay as native UTF-16
//! bytes; decoding is the caller's job.

use std::ffi::OsStr;
use std::io;
use std::os::windows::ffi::OsStrExt;
use std::ptr::{null, null_mut};

use windows_sys::Win32::Devices::HumanInterfaceDevice::{
    HidD_GetManufacturerString, HidD_GetProductString, HidD_GetSerialNumberString,
};
use windows_sys::Win32::Foundation::{CloseHandle, HANDLE, INVALID_HANDLE_VALUE};
use windows_sys::Win32::Storage::FileSystem::{
    CreateFileW, FILE_ATTRIBUTE_NORMAL, FILE_SHARE_READ, FILE_SHARE_WRITE, OPEN_EXISTING,
};

/// The driver caps device strings at 4093 bytes including the terminator.
const STRING_UNITS: usize = 2048;

/// Raw UTF-16 strings for one interface. `None` where the query failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WideStrings {
    pub manufacturer: Option<Vec<u8>>,
    pub product: Option<Vec<u8>>,
    pub serial_number: Option<Vec<u8>>,
}

struct OwnedHandle(HANDLE);

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        unsafe {
            CloseHandle(self.0);
        }
    }
}

fn open_query_handle(path: &str) -> io::Result<OwnedHandle> {
    let wide: Vec<u16> = OsStr::new(path)
        .encode_wide()
        .chain(std::iter::once(0))
        .collect();

    let handle = unsafe {
        CreateFileW(
            wide.as_ptr(),
            0,
            FILE_SHARE_READ | FILE_SHARE_WRITE,
            null(),
            OPEN_EXISTING,
            FILE_ATTRIBUTE_NORMAL,
            null_mut(),
        )
    };
    if handle == INVALID_HANDLE_VALUE {
        Err(io::Error::last_os_error())
    } else {
        Ok(OwnedHandle(handle))
    }
}

type StringQuery = unsafe extern "system" fn(HANDLE, *mut core::ffi::c_void, u32) -> u8;

fn query(handle: &OwnedHandle, f: StringQuery) -> Option<Vec<u8>> {
    let mut buf = vec![0u16; STRING_UNITS];
    let ok = unsafe {
        f(
            handle.0,
            buf.as_mut_ptr().cast(),
            (buf.len() * std::mem::size_of::<u16>()) as u32,
        )
    };
    if ok == 0 {
        return None;
    }
    let end = buf.iter().position(|&u| u == 0).unwrap_or(buf.len());
    Some(buf[..end].iter().flat_map(|u| u.to_ne_bytes()).collect())
}

/// Query the three device strings for the interface at `path`.
pub fn query_wide_strings(path: &str) -> io::Result<WideStrings> {
    let handle = open_query_handle(path)?;
    Ok(WideStrings {
        manufacturer: query(&handle, HidD_GetManufacturerString),
        product: query(&handle, HidD_GetProductString),
        serial_number: query(&handle, HidD_GetSerialNumberString),
    })
}
