#![cfg(target_os = "windows")]

//! Windows backends.
//!
//! - **strings**: manufacturer/product/serial strings straight from the HID class
//!   driver (`HidD_Get*String`), returned in raw UTF-16 form for
//!   [`WideCharDecoder`](crate::wchar::WideCharDecoder).
//!
//! Most users should not call these directly; [`Manager::devices`](crate::Manager::devices)
//! uses them to fill strings `hidapi` could not provide.

pub mod strings;

pub use strings::{query_wide_strings, WideStrings};
