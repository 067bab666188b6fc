#![cfg(target_os = "linux")]

//! Linux backends.
//!
//! - **hidraw**: report descriptor access through the `hidraw` character devices,
//!   used to classify devices whose enumeration record carries no usage.

pub mod hidraw;

pub use hidraw::{HidrawHandle, HidrawOpener};
