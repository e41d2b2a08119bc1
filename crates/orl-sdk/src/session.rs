use tracing::debug;

use orl_ledger::{AuditEvent, DataChanged, LedgerWriter, OwnerChanged, RecordAdded};
use orl_types::{Mutability, OwnerId, RecordId};

use crate::error::SdkResult;
use crate::orl::Orl;

/// A caller identity bound to an ORL handle.
///
/// Every mutation runs as this caller. Sessions are cheap; create one per
/// identity rather than swapping the caller on a shared session.
pub struct Session<'a> {
    orl: &'a Orl,
    caller: OwnerId,
}

impl<'a> Session<'a> {
    pub(crate) fn new(orl: &'a Orl, caller: OwnerId) -> Self {
        Self { orl, caller }
    }

    pub fn caller(&self) -> &OwnerId {
        &self.caller
    }

    /// Append a new record owned by this caller.
    ///
    /// The payload is zero-extended to the fixed width; over-wide payloads
    /// are rejected. Returns the committed audit event, which carries the
    /// assigned record id.
    pub fn add_record(&self, payload: &[u8], mutability: Mutability) -> SdkResult<RecordAdded> {
        let event = self.orl.ledger.add_record(&self.caller, payload, mutability)?;
        debug!(id = %event.id, caller = %self.caller, "record added");
        self.orl.feed.publish(&AuditEvent::RecordAdded(event.clone()));
        Ok(event)
    }

    /// Replace the payload of a mutable record owned by this caller.
    pub fn change_data(&self, id: RecordId, new_payload: &[u8]) -> SdkResult<DataChanged> {
        let event = self.orl.ledger.change_data(&self.caller, id, new_payload)?;
        debug!(id = %id, caller = %self.caller, "data changed");
        self.orl.feed.publish(&AuditEvent::DataChanged(event.clone()));
        Ok(event)
    }

    /// Transfer a mutable record owned by this caller.
    ///
    /// Any target is accepted, including the current owner; a self-transfer
    /// still commits an event.
    pub fn change_owner(&self, id: RecordId, new_owner: &OwnerId) -> SdkResult<OwnerChanged> {
        let event = self.orl.ledger.change_owner(&self.caller, id, new_owner)?;
        debug!(id = %id, caller = %self.caller, new_owner = %new_owner, "owner changed");
        self.orl.feed.publish(&AuditEvent::OwnerChanged(event.clone()));
        Ok(event)
    }
}
