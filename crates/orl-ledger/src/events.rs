use std::fmt;

use serde::{Deserialize, Serialize};

use orl_types::{AuditEventKind, Mutability, OwnerId, Payload, RecordId, TemporalAnchor};

use crate::error::LedgerError;

/// A single entry in the record table.
///
/// Records are the live state of the ledger: the current owner and payload
/// of every id ever assigned. The audit log, not the table, is the source
/// of truth; the table is reconstructible from it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub owner: OwnerId,
    pub payload: Payload,
    pub mutability: Mutability,
}

impl Record {
    pub fn is_mutable(&self) -> bool {
        self.mutability.is_mutable()
    }
}

/// Audit event: a record was created.
///
/// The `actor` is the caller that created the record, which makes it the
/// record's initial owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordAdded {
    pub seq: u64,
    pub event_hash: [u8; 32],
    pub prev_hash: Option<[u8; 32]>,
    pub timestamp: TemporalAnchor,
    pub actor: OwnerId,
    pub id: RecordId,
    pub payload: Payload,
    pub mutability: Mutability,
}

/// Audit event: a mutable record's payload was replaced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataChanged {
    pub seq: u64,
    pub event_hash: [u8; 32],
    pub prev_hash: Option<[u8; 32]>,
    pub timestamp: TemporalAnchor,
    pub actor: OwnerId,
    pub id: RecordId,
    pub old_payload: Payload,
    pub new_payload: Payload,
}

/// Audit event: a mutable record was transferred to a new owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerChanged {
    pub seq: u64,
    pub event_hash: [u8; 32],
    pub prev_hash: Option<[u8; 32]>,
    pub timestamp: TemporalAnchor,
    pub actor: OwnerId,
    pub id: RecordId,
    pub old_owner: OwnerId,
    pub new_owner: OwnerId,
}

/// A hash-linked entry in the audit log.
///
/// Every successful mutation appends exactly one event. Events carry a
/// 1-based sequence number, the hash of the previous event, and a BLAKE3
/// hash over their own canonical encoding, forming a tamper-evident chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditEvent {
    RecordAdded(RecordAdded),
    DataChanged(DataChanged),
    OwnerChanged(OwnerChanged),
}

impl AuditEvent {
    pub fn kind(&self) -> AuditEventKind {
        match self {
            Self::RecordAdded(_) => AuditEventKind::RecordAdded,
            Self::DataChanged(_) => AuditEventKind::DataChanged,
            Self::OwnerChanged(_) => AuditEventKind::OwnerChanged,
        }
    }

    pub fn seq(&self) -> u64 {
        match self {
            Self::RecordAdded(e) => e.seq,
            Self::DataChanged(e) => e.seq,
            Self::OwnerChanged(e) => e.seq,
        }
    }

    pub fn event_hash(&self) -> [u8; 32] {
        match self {
            Self::RecordAdded(e) => e.event_hash,
            Self::DataChanged(e) => e.event_hash,
            Self::OwnerChanged(e) => e.event_hash,
        }
    }

    pub fn prev_hash(&self) -> Option<[u8; 32]> {
        match self {
            Self::RecordAdded(e) => e.prev_hash,
            Self::DataChanged(e) => e.prev_hash,
            Self::OwnerChanged(e) => e.prev_hash,
        }
    }

    pub fn timestamp(&self) -> TemporalAnchor {
        match self {
            Self::RecordAdded(e) => e.timestamp,
            Self::DataChanged(e) => e.timestamp,
            Self::OwnerChanged(e) => e.timestamp,
        }
    }

    /// The caller that performed the mutation.
    pub fn actor(&self) -> &OwnerId {
        match self {
            Self::RecordAdded(e) => &e.actor,
            Self::DataChanged(e) => &e.actor,
            Self::OwnerChanged(e) => &e.actor,
        }
    }

    /// The record this event touches.
    pub fn record_id(&self) -> RecordId {
        match self {
            Self::RecordAdded(e) => e.id,
            Self::DataChanged(e) => e.id,
            Self::OwnerChanged(e) => e.id,
        }
    }

    pub(crate) fn set_event_hash(&mut self, hash: [u8; 32]) {
        match self {
            Self::RecordAdded(e) => e.event_hash = hash,
            Self::DataChanged(e) => e.event_hash = hash,
            Self::OwnerChanged(e) => e.event_hash = hash,
        }
    }

    /// Short hex of the event hash, for log display.
    pub fn short_hash(&self) -> String {
        hex::encode(&self.event_hash()[..4])
    }
}

/// Lightweight reference to an audit event (head pointers, summaries).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRef {
    pub seq: u64,
    pub event_hash: [u8; 32],
    pub kind: AuditEventKind,
}

impl AuditRef {
    pub fn short_hash(&self) -> String {
        hex::encode(&self.event_hash[..4])
    }
}

impl From<&AuditEvent> for AuditRef {
    fn from(event: &AuditEvent) -> Self {
        Self {
            seq: event.seq(),
            event_hash: event.event_hash(),
            kind: event.kind(),
        }
    }
}

impl fmt::Display for AuditRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e#{} [{}]", self.seq, self.short_hash())
    }
}

/// Canonical hash of an audit event.
///
/// The event is re-encoded with a zeroed `event_hash` field so the hash
/// covers everything except itself, then hashed with a domain prefix.
pub(crate) fn compute_event_hash(event: &AuditEvent) -> Result<[u8; 32], LedgerError> {
    let mut canonical = event.clone();
    canonical.set_event_hash([0; 32]);

    let encoded =
        serde_json::to_vec(&canonical).map_err(|e| LedgerError::Serialization(e.to_string()))?;

    let mut hasher = blake3::Hasher::new();
    hasher.update(b"orl-audit-v1:");
    hasher.update(&encoded);
    Ok(*hasher.finalize().as_bytes())
}
