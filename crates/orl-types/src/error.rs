use thiserror::Error;

use crate::payload::PAYLOAD_WIDTH;

/// Errors produced by type operations.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("payload is {actual} bytes, wider than the {}-byte record slot", PAYLOAD_WIDTH)]
    PayloadTooWide { actual: usize },

    #[error("invalid record id: {0}")]
    InvalidRecordId(String),
}
