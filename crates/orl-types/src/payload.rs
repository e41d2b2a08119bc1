use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Width of a record payload slot, in bytes.
pub const PAYLOAD_WIDTH: usize = 32;

/// Fixed-width record payload.
///
/// Every record stores exactly [`PAYLOAD_WIDTH`] bytes. Narrower inputs are
/// widened by zero-extension on the right: the input occupies the leading
/// bytes and the remainder is zero-filled. `0x123` therefore normalizes to
/// `0x1230…00`, and inputs that differ only in trailing zero bytes collapse
/// to the same stored payload. Inputs wider than the slot are rejected.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Payload([u8; PAYLOAD_WIDTH]);

impl Payload {
    /// The all-zero payload.
    pub const fn zero() -> Self {
        Self([0u8; PAYLOAD_WIDTH])
    }

    /// Widen raw bytes into a payload slot.
    ///
    /// Inputs up to [`PAYLOAD_WIDTH`] bytes are copied to the front of the
    /// slot and zero-extended. Wider inputs return
    /// [`TypeError::PayloadTooWide`] rather than being truncated.
    pub fn normalize(input: &[u8]) -> Result<Self, TypeError> {
        if input.len() > PAYLOAD_WIDTH {
            return Err(TypeError::PayloadTooWide {
                actual: input.len(),
            });
        }
        let mut slot = [0u8; PAYLOAD_WIDTH];
        slot[..input.len()].copy_from_slice(input);
        Ok(Self(slot))
    }

    /// Parse a payload from a hex string.
    ///
    /// Accepts an optional `0x` prefix. Odd-length hex is padded with a
    /// trailing zero nibble before decoding, so `0x123` reads as the two
    /// bytes `12 30`. The decoded bytes then widen via [`Payload::normalize`].
    pub fn parse_hex(s: &str) -> Result<Self, TypeError> {
        let s = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let padded;
        let digits = if s.len() % 2 == 1 {
            padded = format!("{s}0");
            padded.as_str()
        } else {
            s
        };
        let bytes = hex::decode(digits).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Self::normalize(&bytes)
    }

    /// The raw payload bytes.
    pub fn as_bytes(&self) -> &[u8; PAYLOAD_WIDTH] {
        &self.0
    }

    /// Full hex encoding (64 characters, no prefix).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Leading 8 hex characters, for log summaries.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Returns `true` if every byte is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; PAYLOAD_WIDTH]
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Payload(0x{}…)", self.short_hex())
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}
