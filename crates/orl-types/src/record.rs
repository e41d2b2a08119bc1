use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Identifier of a record in the ledger.
///
/// Record ids are dense: the first record is `0`, the second `1`, and so on
/// with no gaps. An id is assigned once at creation and never reused, so a
/// `RecordId` doubles as the record's position in the ledger table.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RecordId(u64);

impl RecordId {
    pub const fn new(index: u64) -> Self {
        Self(index)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Position in the record table.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl FromStr for RecordId {
    type Err = TypeError;

    /// Parse from a decimal string, `rec#` prefix optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("rec#").unwrap_or(s);
        digits
            .parse::<u64>()
            .map(Self)
            .map_err(|_| TypeError::InvalidRecordId(s.to_string()))
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rec#{}", self.0)
    }
}

/// Whether a record admits changes after creation.
///
/// Chosen once when the record is added and fixed for the record's lifetime.
/// Immutable records reject both payload changes and ownership transfers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mutability {
    Mutable,
    Immutable,
}

impl Mutability {
    pub fn from_flag(mutable: bool) -> Self {
        if mutable {
            Self::Mutable
        } else {
            Self::Immutable
        }
    }

    pub fn is_mutable(&self) -> bool {
        matches!(self, Self::Mutable)
    }
}

impl fmt::Display for Mutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mutable => write!(f, "mutable"),
            Self::Immutable => write!(f, "immutable"),
        }
    }
}
