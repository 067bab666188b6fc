//! Platform wide-character string decoding.
//!
//! Device strings (manufacturer, product, serial) arrive from the OS as
//! null-terminated `wchar_t` buffers. The width of `wchar_t` is a property of the
//! target platform, not of the data: 2 bytes (UTF-16) on Windows, 4 bytes (UTF-32)
//! on most Unix systems. [`WideCharDecoder`] fixes the width once at construction
//! and never branches on it per character.
//!
//! # Conventions
//! - Buffers are passed as native-endian byte slices. The first zero unit ends the
//!   string; so does the end of the slice. Trailing bytes too short to form a
//!   whole unit count as that end and are ignored.
//! - An absent buffer (`None`) decodes to the empty string.
//! - Error positions are 1-based counts of units consumed, see [`DecodeError`].
//!
//! # Example
//! ```
//! use hidlink::wchar::{WideCharDecoder, WideWidth};
//!
//! let units: Vec<u8> = [0x41u16, 0x42, 0]
//!     .iter()
//!     .flat_map(|u| u.to_ne_bytes())
//!     .collect();
//! let dec = WideCharDecoder::with_width(WideWidth::Two);
//! assert_eq!(dec.decode(Some(&units)).unwrap(), "AB");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, Error};

/// Width of one platform wide-character unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WideWidth {
    /// 16-bit units with surrogate pairs (Windows).
    Two,
    /// 32-bit units, one code point each (Linux, macOS, BSDs).
    Four,
}

impl WideWidth {
    /// Width of `wchar_t` on the compilation target.
    pub const fn native() -> Self {
        if cfg!(windows) {
            WideWidth::Two
        } else {
            WideWidth::Four
        }
    }

    /// Unit size in bytes.
    pub const fn bytes(self) -> usize {
        match self {
            WideWidth::Two => 2,
            WideWidth::Four => 4,
        }
    }
}

impl TryFrom<usize> for WideWidth {
    type Error = Error;

    fn try_from(bytes: usize) -> Result<Self, Self::Error> {
        match bytes {
            2 => Ok(WideWidth::Two),
            4 => Ok(WideWidth::Four),
            other => Err(Error::UnsupportedWideWidth(other)),
        }
    }
}

/// Decoder for null-terminated wide strings of a fixed unit width.
///
/// Stateless and `Copy`; safe to share between threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WideCharDecoder {
    width: WideWidth,
}

impl WideCharDecoder {
    /// Build a decoder for a width given in bytes.
    ///
    /// Any width other than 2 or 4 means the platform is unsupported and fails with
    /// [`Error::UnsupportedWideWidth`].
    pub fn new(width_bytes: usize) -> Result<Self, Error> {
        WideWidth::try_from(width_bytes).map(Self::with_width)
    }

    pub const fn with_width(width: WideWidth) -> Self {
        Self { width }
    }

    /// Decoder matching this platform's `wchar_t`.
    pub const fn native() -> Self {
        Self::with_width(WideWidth::native())
    }

    pub fn width(&self) -> WideWidth {
        self.width
    }

    /// Decode a native-endian wide buffer into a `String`.
    ///
    /// Partial output is discarded on failure. A slice whose length is not a
    /// multiple of the unit width ends at its last whole unit.
    pub fn decode(&self, buf: Option<&[u8]>) -> Result<String, DecodeError> {
        let Some(bytes) = buf else {
            return Ok(String::new());
        };
        match self.width {
            WideWidth::Two => decode_utf16_units(bytes),
            WideWidth::Four => decode_utf32_units(bytes),
        }
    }

    /// Decode a raw null-terminated `wchar_t` string.
    ///
    /// A null pointer decodes to the empty string.
    ///
    /// # Safety
    /// `ptr` must be null or point to a readable sequence of units of this
    /// decoder's width, terminated by a zero unit.
    pub unsafe fn decode_raw(&self, ptr: *const u8) -> Result<String, DecodeError> {
        if ptr.is_null() {
            return Ok(String::new());
        }
        let width = self.width.bytes();
        let mut len = 0usize;
        loop {
            let unit = ptr.add(len * width);
            let zero = match self.width {
                WideWidth::Two => unit.cast::<u16>().read_unaligned() == 0,
                WideWidth::Four => unit.cast::<u32>().read_unaligned() == 0,
            };
            if zero {
                break;
            }
            len += 1;
        }
        let bytes = std::slice::from_raw_parts(ptr, len * width);
        self.decode(Some(bytes))
    }
}

impl Default for WideCharDecoder {
    fn default() -> Self {
        Self::native()
    }
}

/// Unit `idx`, or 0 when the slice has no whole unit there.
#[inline]
fn unit16(bytes: &[u8], idx: usize) -> u16 {
    bytes
        .get(idx * 2..idx * 2 + 2)
        .map(|b| u16::from_ne_bytes([b[0], b[1]]))
        .unwrap_or(0)
}

#[inline]
fn unit32(bytes: &[u8], idx: usize) -> u32 {
    bytes
        .get(idx * 4..idx * 4 + 4)
        .map(|b| u32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
        .unwrap_or(0)
}

#[inline]
fn is_surrogate(unit: u16) -> bool {
    (0xD800..=0xDFFF).contains(&unit)
}

fn decode_utf16_units(bytes: &[u8]) -> Result<String, DecodeError> {
    let mut out = String::new();
    let mut consumed = 0usize;
    loop {
        let lead = unit16(bytes, consumed);
        if lead == 0 {
            break;
        }
        consumed += 1;

        if !is_surrogate(lead) {
            let ch = char::from_u32(u32::from(lead)).ok_or(DecodeError::InvalidRune(consumed))?;
            out.push(ch);
            continue;
        }

        // A surrogate always takes the following unit, even the terminator.
        let trail = unit16(bytes, consumed);
        let ch = char::decode_utf16([lead, trail])
            .next()
            .and_then(Result::ok)
            .ok_or(DecodeError::InvalidSurrogatePair(consumed))?;
        out.push(ch);
        consumed += 1;
    }
    Ok(out)
}

fn decode_utf32_units(bytes: &[u8]) -> Result<String, DecodeError> {
    let mut out = String::new();
    let mut consumed = 0usize;
    loop {
        let unit = unit32(bytes, consumed);
        if unit == 0 {
            break;
        }
        consumed += 1;
        let ch = char::from_u32(unit).ok_or(DecodeError::InvalidRune(consumed))?;
        out.push(ch);
    }
    Ok(out)
}
