use orl_types::{OwnerId, RecordId, TypeError};

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("record {id} does not exist")]
    RecordNotFound { id: RecordId },

    #[error("caller {caller} does not own record {id}")]
    Unauthorized { id: RecordId, caller: OwnerId },

    #[error("record {id} is immutable")]
    ImmutableRecord { id: RecordId },

    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] TypeError),

    #[error("integrity violation at seq {seq}: {reason}")]
    IntegrityViolation { seq: u64, reason: String },

    #[error("hash collision detected")]
    HashCollision,

    #[error("invalid sequence range: from={from}, to={to}")]
    InvalidRange { from: u64, to: u64 },

    #[error("serialization error: {0}")]
    Serialization(String),
}
