//! Crate error types.
//!
//! Decoding failures ([`DecodeError`]) are recoverable per field: callers may skip
//! the string, log it, or abort building the device record. [`Error`] is the
//! crate-wide error returned by device access and configuration.

use thiserror::Error;

/// Failure while decoding a platform wide-character string.
///
/// Positions count wide units consumed so far (1-based), not bytes and not
/// resulting characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A unit (or pair) produced a value outside the Unicode scalar range.
    #[error("invalid rune at position {0}")]
    InvalidRune(usize),

    /// A surrogate was not part of a valid high/low pair.
    #[error("invalid surrogate pair at position {0}")]
    InvalidSurrogatePair(usize),
}

/// Crate-wide error.
#[derive(Debug, Error)]
pub enum Error {
    /// The platform's wide-character width is neither 2 nor 4 bytes.
    #[error("unsupported wide character width: {0} bytes")]
    UnsupportedWideWidth(usize),

    /// A device string could not be decoded.
    #[error("unable to convert {field} string: {source}")]
    Decode {
        field: &'static str,
        #[source]
        source: DecodeError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[cfg(feature = "hid")]
    #[error("hidapi: {0}")]
    Hid(#[from] hidapi::HidError),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// The transport refused to open the device.
    #[error("unable to open device: {0}")]
    Open(String),

    /// The transport accepted fewer bytes than requested.
    #[error("only wrote {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    /// The device has been closed.
    #[error("device is closed")]
    Closed,

    /// The background read loop stopped.
    #[error("unable to read from HID device: {0}")]
    ReadLoop(String),
}

pub type Result<T> = std::result::Result<T, Error>;
