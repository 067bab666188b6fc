//! Open-device interface.
//!
//! A [`Device`] is one opened HID interface. Output reports go out through
//! [`Device::write`]; input reports arrive on a bounded channel fed by a background
//! read loop that starts the first time [`Device::read_channel`] is called.
//!
//! When the loop hits a read error it records the error, closes the channel and
//! exits. Receivers observe the closed channel; the cause is available from
//! [`Device::take_read_error`].

use std::sync::mpsc::Receiver;

use crate::error::{Error, Result};
use crate::info::DeviceInfo;

pub trait Device: Send {
    /// The record this device was opened from.
    fn info(&self) -> &DeviceInfo;

    /// Send one output report. Writing fewer bytes than `data.len()` is an error.
    fn write(&self, data: &[u8]) -> Result<()>;

    /// Input report channel. The read loop is spawned on the first call only.
    fn read_channel(&mut self) -> Result<&Receiver<Vec<u8>>>;

    /// The error that stopped the read loop, if any. Returns it once.
    fn take_read_error(&self) -> Option<Error>;

    /// Stop the read loop and release the OS handle. Idempotent.
    fn close(&mut self);
}
