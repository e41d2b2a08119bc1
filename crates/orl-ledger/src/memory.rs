use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use orl_types::{Mutability, OwnerId, Payload, RecordId, TemporalAnchor};

use crate::error::LedgerError;
use crate::events::{
    compute_event_hash, AuditEvent, AuditRef, DataChanged, OwnerChanged, Record, RecordAdded,
};
use crate::replay::ReplayEngine;
use crate::traits::{LedgerReader, LedgerWriter};

/// In-memory ORL implementation for tests, local tools, and embedding.
///
/// A single write lock serializes all mutations, so the record table and
/// the audit log always move together.
#[derive(Debug)]
pub struct InMemoryLedger {
    node_id: u16,
    inner: RwLock<LedgerState>,
}

#[derive(Debug, Default)]
struct LedgerState {
    records: Vec<Record>,
    audit: Vec<AuditEvent>,
    hash_index: HashMap<[u8; 32], usize>,
}

impl InMemoryLedger {
    pub fn new(node_id: u16) -> Self {
        Self {
            node_id,
            inner: RwLock::new(LedgerState::default()),
        }
    }

    /// Rebuild a ledger from a serialized audit log.
    ///
    /// The chain is verified link by link (sequence, previous hash, and
    /// recomputed event hash) and then replayed into a fresh record table.
    /// A log that could not have been produced by a live ledger is rejected.
    pub fn restore(events: Vec<AuditEvent>, node_id: u16) -> Result<Self, LedgerError> {
        verify_chain(&events)?;

        let hash_index = events
            .iter()
            .enumerate()
            .map(|(index, event)| (event.event_hash(), index))
            .collect();

        let replayed = ReplayEngine::replay_events(&events)?;
        debug!(
            events = events.len(),
            records = replayed.records.len(),
            "ledger restored from audit log"
        );

        Ok(Self {
            node_id,
            inner: RwLock::new(LedgerState {
                records: replayed.records,
                audit: events,
                hash_index,
            }),
        })
    }

    /// Verify sequence density, hash chain linkage, and event hashes.
    ///
    /// Returns the first violation found. For a full report, use
    /// [`crate::validation::AuditValidator`].
    pub fn validate_log(&self) -> Result<(), LedgerError> {
        let events = self.read_all()?;
        verify_chain(&events)
    }

    fn append_event(
        state: &mut LedgerState,
        mut event: AuditEvent,
    ) -> Result<AuditEvent, LedgerError> {
        let expected_seq = (state.audit.len() + 1) as u64;
        if event.seq() != expected_seq {
            return Err(LedgerError::IntegrityViolation {
                seq: event.seq(),
                reason: format!("append attempted out of order; expected seq {expected_seq}"),
            });
        }

        let expected_prev = state.audit.last().map(AuditEvent::event_hash);
        if event.prev_hash() != expected_prev {
            return Err(LedgerError::IntegrityViolation {
                seq: event.seq(),
                reason: "append attempted with mismatched previous hash".into(),
            });
        }

        let event_hash = compute_event_hash(&event)?;
        if state.hash_index.contains_key(&event_hash) {
            return Err(LedgerError::HashCollision);
        }

        event.set_event_hash(event_hash);
        state.audit.push(event.clone());
        state.hash_index.insert(event_hash, state.audit.len() - 1);

        Ok(event)
    }

    fn log_position(
        state: &LedgerState,
        node_id: u16,
    ) -> (u64, Option<[u8; 32]>, TemporalAnchor) {
        let last = state.audit.last();
        let seq = (state.audit.len() + 1) as u64;
        let prev_hash = last.map(AuditEvent::event_hash);
        let timestamp = match last {
            Some(event) => event.timestamp().successor(node_id),
            None => TemporalAnchor::now(node_id),
        };
        (seq, prev_hash, timestamp)
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new(0)
    }
}

impl LedgerWriter for InMemoryLedger {
    fn add_record(
        &self,
        caller: &OwnerId,
        payload: &[u8],
        mutability: Mutability,
    ) -> Result<RecordAdded, LedgerError> {
        let mut state = self
            .inner
            .write()
            .map_err(|_| LedgerError::IntegrityViolation {
                seq: 0,
                reason: "ledger write lock poisoned".into(),
            })?;

        let payload = Payload::normalize(payload)?;
        let id = RecordId::new(state.records.len() as u64);
        let (seq, prev_hash, timestamp) = Self::log_position(&state, self.node_id);

        let added = RecordAdded {
            seq,
            event_hash: [0; 32],
            prev_hash,
            timestamp,
            actor: caller.clone(),
            id,
            payload,
            mutability,
        };

        let event = Self::append_event(&mut state, AuditEvent::RecordAdded(added))?;

        state.records.push(Record {
            id,
            owner: caller.clone(),
            payload,
            mutability,
        });

        debug!(id = %id, owner = %caller, %mutability, "record added");

        match event {
            AuditEvent::RecordAdded(e) => Ok(e),
            _ => unreachable!(),
        }
    }

    fn change_data(
        &self,
        caller: &OwnerId,
        id: RecordId,
        new_payload: &[u8],
    ) -> Result<DataChanged, LedgerError> {
        let mut state = self
            .inner
            .write()
            .map_err(|_| LedgerError::IntegrityViolation {
                seq: 0,
                reason: "ledger write lock poisoned".into(),
            })?;

        let record = state
            .records
            .get(id.index())
            .ok_or(LedgerError::RecordNotFound { id })?;
        if !record.is_mutable() {
            return Err(LedgerError::ImmutableRecord { id });
        }
        if &record.owner != caller {
            return Err(LedgerError::Unauthorized {
                id,
                caller: caller.clone(),
            });
        }
        let old_payload = record.payload;

        let new_payload = Payload::normalize(new_payload)?;
        let (seq, prev_hash, timestamp) = Self::log_position(&state, self.node_id);

        let changed = DataChanged {
            seq,
            event_hash: [0; 32],
            prev_hash,
            timestamp,
            actor: caller.clone(),
            id,
            old_payload,
            new_payload,
        };

        let event = Self::append_event(&mut state, AuditEvent::DataChanged(changed))?;

        state.records[id.index()].payload = new_payload;

        debug!(id = %id, owner = %caller, "payload changed");

        match event {
            AuditEvent::DataChanged(e) => Ok(e),
            _ => unreachable!(),
        }
    }

    fn change_owner(
        &self,
        caller: &OwnerId,
        id: RecordId,
        new_owner: &OwnerId,
    ) -> Result<OwnerChanged, LedgerError> {
        let mut state = self
            .inner
            .write()
            .map_err(|_| LedgerError::IntegrityViolation {
                seq: 0,
                reason: "ledger write lock poisoned".into(),
            })?;

        let record = state
            .records
            .get(id.index())
            .ok_or(LedgerError::RecordNotFound { id })?;
        if !record.is_mutable() {
            return Err(LedgerError::ImmutableRecord { id });
        }
        if &record.owner != caller {
            return Err(LedgerError::Unauthorized {
                id,
                caller: caller.clone(),
            });
        }
        let old_owner = record.owner.clone();

        let (seq, prev_hash, timestamp) = Self::log_position(&state, self.node_id);

        let transferred = OwnerChanged {
            seq,
            event_hash: [0; 32],
            prev_hash,
            timestamp,
            actor: caller.clone(),
            id,
            old_owner: old_owner.clone(),
            new_owner: new_owner.clone(),
        };

        let event = Self::append_event(&mut state, AuditEvent::OwnerChanged(transferred))?;

        state.records[id.index()].owner = new_owner.clone();

        debug!(id = %id, from = %old_owner, to = %new_owner, "owner changed");

        match event {
            AuditEvent::OwnerChanged(e) => Ok(e),
            _ => unreachable!(),
        }
    }
}

impl LedgerReader for InMemoryLedger {
    fn record(&self, id: RecordId) -> Result<Record, LedgerError> {
        let state = self
            .inner
            .read()
            .map_err(|_| LedgerError::IntegrityViolation {
                seq: 0,
                reason: "ledger read lock poisoned".into(),
            })?;

        state
            .records
            .get(id.index())
            .cloned()
            .ok_or(LedgerError::RecordNotFound { id })
    }

    fn record_count(&self) -> Result<u64, LedgerError> {
        let state = self
            .inner
            .read()
            .map_err(|_| LedgerError::IntegrityViolation {
                seq: 0,
                reason: "ledger read lock poisoned".into(),
            })?;

        Ok(state.records.len() as u64)
    }

    fn head(&self) -> Result<Option<AuditRef>, LedgerError> {
        let state = self
            .inner
            .read()
            .map_err(|_| LedgerError::IntegrityViolation {
                seq: 0,
                reason: "ledger read lock poisoned".into(),
            })?;

        Ok(state.audit.last().map(AuditRef::from))
    }

    fn read_range(&self, from_seq: u64, to_seq: u64) -> Result<Vec<AuditEvent>, LedgerError> {
        if from_seq == 0 || to_seq == 0 || from_seq > to_seq {
            return Err(LedgerError::InvalidRange {
                from: from_seq,
                to: to_seq,
            });
        }

        let state = self
            .inner
            .read()
            .map_err(|_| LedgerError::IntegrityViolation {
                seq: 0,
                reason: "ledger read lock poisoned".into(),
            })?;

        let start = (from_seq - 1) as usize;
        if start >= state.audit.len() {
            return Ok(vec![]);
        }

        let end_exclusive = to_seq.min(state.audit.len() as u64) as usize;
        Ok(state.audit[start..end_exclusive].to_vec())
    }

    fn read_all(&self) -> Result<Vec<AuditEvent>, LedgerError> {
        let state = self
            .inner
            .read()
            .map_err(|_| LedgerError::IntegrityViolation {
                seq: 0,
                reason: "ledger read lock poisoned".into(),
            })?;

        Ok(state.audit.clone())
    }

    fn get_by_hash(&self, hash: [u8; 32]) -> Result<Option<AuditEvent>, LedgerError> {
        let state = self
            .inner
            .read()
            .map_err(|_| LedgerError::IntegrityViolation {
                seq: 0,
                reason: "ledger read lock poisoned".into(),
            })?;

        let Some(index) = state.hash_index.get(&hash) else {
            return Ok(None);
        };

        Ok(state.audit.get(*index).cloned())
    }

    fn event_count(&self) -> Result<u64, LedgerError> {
        let state = self
            .inner
            .read()
            .map_err(|_| LedgerError::IntegrityViolation {
                seq: 0,
                reason: "ledger read lock poisoned".into(),
            })?;

        Ok(state.audit.len() as u64)
    }
}

/// Check that `events` form a well-linked audit chain, stopping at the
/// first violation.
fn verify_chain(events: &[AuditEvent]) -> Result<(), LedgerError> {
    for (index, event) in events.iter().enumerate() {
        let expected_seq = (index + 1) as u64;
        if event.seq() != expected_seq {
            return Err(LedgerError::IntegrityViolation {
                seq: event.seq(),
                reason: format!("expected seq {expected_seq}, found {}", event.seq()),
            });
        }

        let expected_prev = if index == 0 {
            None
        } else {
            Some(events[index - 1].event_hash())
        };
        if event.prev_hash() != expected_prev {
            return Err(LedgerError::IntegrityViolation {
                seq: event.seq(),
                reason: "previous hash link mismatch".into(),
            });
        }

        let computed = compute_event_hash(event)?;
        if computed != event.event_hash() {
            return Err(LedgerError::IntegrityViolation {
                seq: event.seq(),
                reason: "event hash mismatch".into(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use orl_types::PAYLOAD_WIDTH;

    fn owner(label: &str) -> OwnerId {
        OwnerId::from_label(label)
    }

    #[test]
    fn add_and_get_record() {
        let ledger = InMemoryLedger::default();
        let alice = owner("alice");

        let added = ledger
            .add_record(&alice, &[0x12, 0x30], Mutability::Mutable)
            .unwrap();

        assert_eq!(added.seq, 1);
        assert_eq!(added.id, RecordId::new(0));
        assert_eq!(added.actor, alice);

        let record = ledger.record(RecordId::new(0)).unwrap();
        assert_eq!(record.owner, alice);
        assert_eq!(record.payload, Payload::parse_hex("0x123").unwrap());
        assert_eq!(record.mutability, Mutability::Mutable);
    }

    #[test]
    fn ids_are_dense_and_ascending() {
        let ledger = InMemoryLedger::default();
        let alice = owner("alice");

        for expected in 0..3u64 {
            let added = ledger
                .add_record(&alice, &[expected as u8 + 1], Mutability::Mutable)
                .unwrap();
            assert_eq!(added.id, RecordId::new(expected));
        }

        assert_eq!(ledger.record_count().unwrap(), 3);
        assert_eq!(ledger.event_count().unwrap(), 3);
    }

    #[test]
    fn change_data_replaces_payload() {
        let ledger = InMemoryLedger::default();
        let alice = owner("alice");

        let added = ledger
            .add_record(&alice, &[0x01], Mutability::Mutable)
            .unwrap();
        let changed = ledger
            .change_data(&alice, added.id, &[0x02])
            .unwrap();

        assert_eq!(changed.seq, 2);
        assert_eq!(changed.prev_hash, Some(added.event_hash));
        assert_eq!(changed.old_payload, Payload::normalize(&[0x01]).unwrap());
        assert_eq!(changed.new_payload, Payload::normalize(&[0x02]).unwrap());

        let record = ledger.record(added.id).unwrap();
        assert_eq!(record.payload, changed.new_payload);
    }

    #[test]
    fn change_owner_transfers_control() {
        let ledger = InMemoryLedger::default();
        let alice = owner("alice");
        let bob = owner("bob");

        let added = ledger
            .add_record(&alice, &[0xaa], Mutability::Mutable)
            .unwrap();
        let transferred = ledger.change_owner(&alice, added.id, &bob).unwrap();

        assert_eq!(transferred.old_owner, alice);
        assert_eq!(transferred.new_owner, bob);
        assert_eq!(ledger.record(added.id).unwrap().owner, bob);

        // Control follows the transfer.
        ledger.change_data(&bob, added.id, &[0xbb]).unwrap();
        let error = ledger.change_data(&alice, added.id, &[0xcc]).unwrap_err();
        assert_eq!(
            error,
            LedgerError::Unauthorized {
                id: added.id,
                caller: alice,
            },
        );
    }

    #[test]
    fn non_owner_is_rejected_without_state_change() {
        let ledger = InMemoryLedger::default();
        let alice = owner("alice");
        let bob = owner("bob");

        let added = ledger
            .add_record(&alice, &[0x11], Mutability::Mutable)
            .unwrap();

        let error = ledger.change_data(&bob, added.id, &[0x22]).unwrap_err();
        assert!(matches!(error, LedgerError::Unauthorized { .. }));

        let error = ledger.change_owner(&bob, added.id, &bob).unwrap_err();
        assert!(matches!(error, LedgerError::Unauthorized { .. }));

        assert_eq!(ledger.record(added.id).unwrap().payload, added.payload);
        assert_eq!(ledger.event_count().unwrap(), 1);
    }

    #[test]
    fn immutable_record_rejects_all_changes() {
        let ledger = InMemoryLedger::default();
        let alice = owner("alice");
        let bob = owner("bob");

        let added = ledger
            .add_record(&alice, &[0x42], Mutability::Immutable)
            .unwrap();

        let error = ledger.change_data(&alice, added.id, &[0x43]).unwrap_err();
        assert_eq!(error, LedgerError::ImmutableRecord { id: added.id });

        let error = ledger.change_owner(&alice, added.id, &bob).unwrap_err();
        assert_eq!(error, LedgerError::ImmutableRecord { id: added.id });

        assert_eq!(ledger.event_count().unwrap(), 1);
        assert_eq!(ledger.record(added.id).unwrap().owner, alice);
    }

    #[test]
    fn missing_record_errors() {
        let ledger = InMemoryLedger::default();
        let alice = owner("alice");
        let id = RecordId::new(5);

        assert_eq!(
            ledger.record(id).unwrap_err(),
            LedgerError::RecordNotFound { id },
        );
        assert_eq!(
            ledger.change_data(&alice, id, &[0x01]).unwrap_err(),
            LedgerError::RecordNotFound { id },
        );
        assert_eq!(
            ledger.change_owner(&alice, id, &alice).unwrap_err(),
            LedgerError::RecordNotFound { id },
        );
    }

    #[test]
    fn over_wide_payload_rejected_without_state_change() {
        let ledger = InMemoryLedger::default();
        let alice = owner("alice");
        let wide = [1u8; PAYLOAD_WIDTH + 1];

        let error = ledger
            .add_record(&alice, &wide, Mutability::Mutable)
            .unwrap_err();
        assert!(matches!(error, LedgerError::InvalidPayload(_)));
        assert_eq!(ledger.record_count().unwrap(), 0);
        assert_eq!(ledger.event_count().unwrap(), 0);

        let added = ledger
            .add_record(&alice, &[0x01], Mutability::Mutable)
            .unwrap();
        let error = ledger.change_data(&alice, added.id, &wide).unwrap_err();
        assert!(matches!(error, LedgerError::InvalidPayload(_)));
        assert_eq!(ledger.record(added.id).unwrap().payload, added.payload);
        assert_eq!(ledger.event_count().unwrap(), 1);
    }

    #[test]
    fn self_transfer_is_allowed_and_logged() {
        let ledger = InMemoryLedger::default();
        let alice = owner("alice");

        let added = ledger
            .add_record(&alice, &[0x01], Mutability::Mutable)
            .unwrap();
        let transferred = ledger.change_owner(&alice, added.id, &alice).unwrap();

        assert_eq!(transferred.old_owner, transferred.new_owner);
        assert_eq!(ledger.event_count().unwrap(), 2);
    }

    #[test]
    fn audit_chain_links_and_validates() {
        let ledger = InMemoryLedger::default();
        let alice = owner("alice");
        let bob = owner("bob");

        let added = ledger
            .add_record(&alice, &[0x01], Mutability::Mutable)
            .unwrap();
        ledger.change_data(&alice, added.id, &[0x02]).unwrap();
        ledger.change_owner(&alice, added.id, &bob).unwrap();

        let events = ledger.read_all().unwrap();
        assert_eq!(events.len(), 3);
        for pair in events.windows(2) {
            assert_eq!(pair[1].prev_hash(), Some(pair[0].event_hash()));
        }

        ledger.validate_log().unwrap();
    }

    #[test]
    fn validate_log_detects_tampering() {
        let ledger = InMemoryLedger::default();
        let alice = owner("alice");

        ledger
            .add_record(&alice, &[0x01], Mutability::Mutable)
            .unwrap();
        ledger
            .change_data(&alice, RecordId::new(0), &[0x02])
            .unwrap();

        {
            let mut guard = ledger.inner.write().unwrap();
            if let AuditEvent::DataChanged(e) = &mut guard.audit[1] {
                e.new_payload = Payload::parse_hex("0xff").unwrap();
            }
        }

        let error = ledger.validate_log().unwrap_err();
        assert!(matches!(
            error,
            LedgerError::IntegrityViolation { reason, .. } if reason == "event hash mismatch"
        ));
    }

    #[test]
    fn read_range_is_inclusive_and_validated() {
        let ledger = InMemoryLedger::default();
        let alice = owner("alice");

        ledger
            .add_record(&alice, &[0x01], Mutability::Mutable)
            .unwrap();
        ledger
            .change_data(&alice, RecordId::new(0), &[0x02])
            .unwrap();
        ledger
            .change_data(&alice, RecordId::new(0), &[0x03])
            .unwrap();

        let range = ledger.read_range(1, 2).unwrap();
        assert_eq!(range.len(), 2);
        assert_eq!(range[0].seq(), 1);
        assert_eq!(range[1].seq(), 2);

        // Out-of-bounds upper end clamps; empty past the end.
        assert_eq!(ledger.read_range(2, 10).unwrap().len(), 2);
        assert!(ledger.read_range(5, 10).unwrap().is_empty());

        let error = ledger.read_range(3, 2).unwrap_err();
        assert_eq!(error, LedgerError::InvalidRange { from: 3, to: 2 });
    }

    #[test]
    fn get_by_hash_finds_event() {
        let ledger = InMemoryLedger::default();
        let alice = owner("alice");

        let added = ledger
            .add_record(&alice, &[0x01], Mutability::Mutable)
            .unwrap();

        let found = ledger.get_by_hash(added.event_hash).unwrap();
        assert_eq!(found.map(|e| e.seq()), Some(1));
        assert!(ledger.get_by_hash([0x99; 32]).unwrap().is_none());
    }

    #[test]
    fn restore_rebuilds_state_and_accepts_new_appends() {
        let ledger = InMemoryLedger::default();
        let alice = owner("alice");
        let bob = owner("bob");

        let added = ledger
            .add_record(&alice, &[0x01], Mutability::Mutable)
            .unwrap();
        ledger.change_data(&alice, added.id, &[0x02]).unwrap();
        ledger.change_owner(&alice, added.id, &bob).unwrap();
        ledger
            .add_record(&bob, &[0x03], Mutability::Immutable)
            .unwrap();

        let events = ledger.read_all().unwrap();
        let restored = InMemoryLedger::restore(events, 0).unwrap();

        assert_eq!(restored.record_count().unwrap(), 2);
        assert_eq!(restored.record(added.id).unwrap(), ledger.record(added.id).unwrap());
        assert_eq!(restored.head().unwrap(), ledger.head().unwrap());

        // The restored ledger keeps appending on the same chain.
        let next = restored
            .add_record(&bob, &[0x04], Mutability::Mutable)
            .unwrap();
        assert_eq!(next.seq, 5);
        assert_eq!(
            next.prev_hash,
            ledger.head().unwrap().map(|h| h.event_hash),
        );
        restored.validate_log().unwrap();
    }

    #[test]
    fn restore_rejects_tampered_log() {
        let ledger = InMemoryLedger::default();
        let alice = owner("alice");

        ledger
            .add_record(&alice, &[0x01], Mutability::Mutable)
            .unwrap();

        let mut events = ledger.read_all().unwrap();
        if let AuditEvent::RecordAdded(e) = &mut events[0] {
            e.payload = Payload::parse_hex("0xff").unwrap();
        }

        let error = InMemoryLedger::restore(events, 0).unwrap_err();
        assert!(matches!(
            error,
            LedgerError::IntegrityViolation { reason, .. } if reason == "event hash mismatch"
        ));
    }

    #[test]
    fn timestamps_strictly_increase() {
        let ledger = InMemoryLedger::default();
        let alice = owner("alice");

        for i in 0..5u8 {
            ledger
                .add_record(&alice, &[i + 1], Mutability::Mutable)
                .unwrap();
        }

        let events = ledger.read_all().unwrap();
        for pair in events.windows(2) {
            assert!(pair[1].timestamp() > pair[0].timestamp());
        }
    }

    #[test]
    fn concurrent_adds_keep_ids_dense() {
        use std::sync::Arc;
        use std::thread;

        let ledger = Arc::new(InMemoryLedger::default());

        let mut handles = Vec::new();
        for t in 0u8..4 {
            let ledger = Arc::clone(&ledger);
            handles.push(thread::spawn(move || {
                let who = owner(&format!("writer-{t}"));
                for _ in 0..25 {
                    ledger.add_record(&who, &[t + 1], Mutability::Mutable).unwrap();
                }
            }));
        }

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(ledger.record_count().unwrap(), 100);
        assert_eq!(ledger.event_count().unwrap(), 100);
        ledger.validate_log().unwrap();

        // Every id from 0..100 exists exactly once.
        for i in 0..100u64 {
            let record = ledger.record(RecordId::new(i)).unwrap();
            assert_eq!(record.id, RecordId::new(i));
        }
    }
}
