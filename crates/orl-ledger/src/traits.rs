use orl_types::{Mutability, OwnerId, RecordId};

use crate::error::LedgerError;
use crate::events::{AuditEvent, AuditRef, DataChanged, OwnerChanged, Record, RecordAdded};

/// Write boundary for record mutations.
///
/// Every method takes the caller's identity explicitly; the ledger performs
/// no ambient authentication. Each successful call appends exactly one audit
/// event and returns it.
pub trait LedgerWriter: Send + Sync {
    /// Create a record owned by `caller`.
    ///
    /// The payload is widened to the fixed slot width; inputs wider than the
    /// slot are rejected with no state change. The new record receives the
    /// next dense id.
    fn add_record(
        &self,
        caller: &OwnerId,
        payload: &[u8],
        mutability: Mutability,
    ) -> Result<RecordAdded, LedgerError>;

    /// Replace the payload of a mutable record owned by `caller`.
    fn change_data(
        &self,
        caller: &OwnerId,
        id: RecordId,
        new_payload: &[u8],
    ) -> Result<DataChanged, LedgerError>;

    /// Transfer a mutable record owned by `caller` to `new_owner`.
    ///
    /// Any `new_owner` value is accepted, including the current owner;
    /// a self-transfer still appends an audit event.
    fn change_owner(
        &self,
        caller: &OwnerId,
        id: RecordId,
        new_owner: &OwnerId,
    ) -> Result<OwnerChanged, LedgerError>;
}

/// Read boundary for record lookups and audit log queries.
pub trait LedgerReader: Send + Sync {
    /// Fetch a record by id.
    fn record(&self, id: RecordId) -> Result<Record, LedgerError>;

    /// Total number of records ever created.
    fn record_count(&self) -> Result<u64, LedgerError>;

    /// Reference to the newest audit event, if any.
    fn head(&self) -> Result<Option<AuditRef>, LedgerError>;

    /// Audit events with `from_seq <= seq <= to_seq` (1-based, inclusive).
    fn read_range(&self, from_seq: u64, to_seq: u64) -> Result<Vec<AuditEvent>, LedgerError>;

    /// The full audit log in append order.
    fn read_all(&self) -> Result<Vec<AuditEvent>, LedgerError>;

    /// Look up an audit event by its hash.
    fn get_by_hash(&self, hash: [u8; 32]) -> Result<Option<AuditEvent>, LedgerError>;

    /// Total number of audit events.
    fn event_count(&self) -> Result<u64, LedgerError>;
}
