//! Decoding of the newline-delimited records a receiver prints over serial.
//!
//! A data record looks like `A1B2C3D4E5F6 -65`: a 12 character hardware
//! address followed by a signal strength. The firmware also prints channel
//! hop notices on the same line stream, which are recognised by their first
//! token not being 12 characters long and are skipped.

use nom::{character::complete::i32, combinator::all_consuming, error::Error, Finish};

use std::{error, fmt, str};

/// Length, in bytes, of a device hardware address as printed by the firmware.
pub const DEVICE_ID_LEN: usize = 12;

/// The hardware address of an emitting device. Only ever compared and
/// hashed, never interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId([u8; DEVICE_ID_LEN]);

impl DeviceId {
    /// Builds an id from a token, or `None` if it is not exactly
    /// [`DEVICE_ID_LEN`] bytes long.
    pub fn from_token(token: &[u8]) -> Option<Self> {
        token.try_into().ok().map(DeviceId)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// One decoded data record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    /// Who was heard.
    pub device: DeviceId,
    /// How loud.
    pub strength: i32,
}

/// A line that is neither a data record nor a recognised noise line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The strength token is not text.
    Utf8(str::Utf8Error),
    /// The line does not split into exactly two tokens.
    TokenCount(usize),
    /// The strength token is not a 32 bit integer.
    Strength(String),
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::Utf8(e) => write!(f, "record is not valid utf-8: {e}"),
            RecordError::TokenCount(n) => write!(f, "expected 2 tokens, found {n}"),
            RecordError::Strength(s) => write!(f, "signal strength {s:?} is not an integer"),
        }
    }
}

impl error::Error for RecordError {}

impl From<str::Utf8Error> for RecordError {
    fn from(value: str::Utf8Error) -> Self {
        Self::Utf8(value)
    }
}

fn parse_strength(s: &str) -> Result<i32, RecordError> {
    all_consuming(i32::<&str, Error<&str>>)(s)
        .finish()
        .map(|(_, strength)| strength)
        .map_err(|_| RecordError::Strength(s.to_owned()))
}

/// Decodes one line (with or without its line terminator).
///
/// Returns `Ok(None)` for channel noise lines, whose address token has the
/// wrong length. The length check happens before the strength is looked at.
pub fn parse_record(line: &[u8]) -> Result<Option<Record>, RecordError> {
    let tokens: Vec<&[u8]> = line
        .split(u8::is_ascii_whitespace)
        .filter(|t| !t.is_empty())
        .collect();
    let [id, strength] = tokens[..] else {
        return Err(RecordError::TokenCount(tokens.len()));
    };

    // the id is opaque bytes, only the strength has to be text
    let Some(device) = DeviceId::from_token(id) else {
        return Ok(None);
    };

    Ok(Some(Record {
        device,
        strength: parse_strength(str::from_utf8(strength)?)?,
    }))
}
