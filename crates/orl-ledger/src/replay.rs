use serde::{Deserialize, Serialize};

use orl_types::RecordId;

use crate::error::LedgerError;
use crate::events::{AuditEvent, Record};
use crate::traits::LedgerReader;

/// Result of replaying an audit log into a record table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayResult {
    pub applied_events: u64,
    pub records: Vec<Record>,
}

/// Deterministic replay of the audit log.
///
/// Replay treats the log as the source of truth: it folds events into a
/// fresh record table and rejects any sequence a live ledger could not have
/// produced (gapped ids, mutations of unknown or immutable records,
/// mutations by a non-owner at that point in history).
pub struct ReplayEngine;

impl ReplayEngine {
    /// Replay a ledger's full audit log.
    pub fn replay<R: LedgerReader>(reader: &R) -> Result<ReplayResult, LedgerError> {
        let events = reader.read_all()?;
        Self::replay_events(&events)
    }

    /// Replay a standalone event sequence.
    pub fn replay_events(events: &[AuditEvent]) -> Result<ReplayResult, LedgerError> {
        apply_events(events)
    }

    /// Replay the log and compare the result with the live record table.
    pub fn verify_convergence<R: LedgerReader>(reader: &R) -> Result<bool, LedgerError> {
        let replayed = Self::replay(reader)?;

        let count = reader.record_count()?;
        let mut live = Vec::with_capacity(count as usize);
        for index in 0..count {
            live.push(reader.record(RecordId::new(index))?);
        }

        Ok(replayed.records == live)
    }
}

fn apply_events(events: &[AuditEvent]) -> Result<ReplayResult, LedgerError> {
    let mut records: Vec<Record> = Vec::new();
    let mut applied = 0u64;

    for event in events {
        match event {
            AuditEvent::RecordAdded(e) => {
                let expected = RecordId::new(records.len() as u64);
                if e.id != expected {
                    return Err(LedgerError::IntegrityViolation {
                        seq: e.seq,
                        reason: format!("expected record id {expected}, found {}", e.id),
                    });
                }
                records.push(Record {
                    id: e.id,
                    owner: e.actor.clone(),
                    payload: e.payload,
                    mutability: e.mutability,
                });
            }
            AuditEvent::DataChanged(e) => {
                let record = records.get_mut(e.id.index()).ok_or_else(|| {
                    LedgerError::IntegrityViolation {
                        seq: e.seq,
                        reason: format!("payload change references unknown record {}", e.id),
                    }
                })?;
                if !record.mutability.is_mutable() {
                    return Err(LedgerError::IntegrityViolation {
                        seq: e.seq,
                        reason: format!("immutable record {} was mutated", e.id),
                    });
                }
                if record.owner != e.actor {
                    return Err(LedgerError::IntegrityViolation {
                        seq: e.seq,
                        reason: format!("payload change on {} by non-owner", e.id),
                    });
                }
                if record.payload != e.old_payload {
                    return Err(LedgerError::IntegrityViolation {
                        seq: e.seq,
                        reason: "recorded old payload does not match replayed state".into(),
                    });
                }
                record.payload = e.new_payload;
            }
            AuditEvent::OwnerChanged(e) => {
                let record = records.get_mut(e.id.index()).ok_or_else(|| {
                    LedgerError::IntegrityViolation {
                        seq: e.seq,
                        reason: format!("owner change references unknown record {}", e.id),
                    }
                })?;
                if !record.mutability.is_mutable() {
                    return Err(LedgerError::IntegrityViolation {
                        seq: e.seq,
                        reason: format!("immutable record {} was transferred", e.id),
                    });
                }
                if record.owner != e.actor {
                    return Err(LedgerError::IntegrityViolation {
                        seq: e.seq,
                        reason: format!("owner change on {} by non-owner", e.id),
                    });
                }
                if record.owner != e.old_owner {
                    return Err(LedgerError::IntegrityViolation {
                        seq: e.seq,
                        reason: "recorded old owner does not match replayed state".into(),
                    });
                }
                record.owner = e.new_owner.clone();
            }
        }
        applied += 1;
    }

    Ok(ReplayResult {
        applied_events: applied,
        records,
    })
}

#[cfg(test)]
mod tests {
    use orl_types::{Mutability, OwnerId, Payload, TemporalAnchor};

    use crate::events::DataChanged;
    use crate::memory::InMemoryLedger;
    use crate::traits::{LedgerReader, LedgerWriter};

    use super::*;

    fn owner(label: &str) -> OwnerId {
        OwnerId::from_label(label)
    }

    fn populated_ledger() -> InMemoryLedger {
        let ledger = InMemoryLedger::default();
        let alice = owner("alice");
        let bob = owner("bob");

        let first = ledger
            .add_record(&alice, &[0x01], Mutability::Mutable)
            .unwrap();
        ledger
            .add_record(&bob, &[0x02], Mutability::Immutable)
            .unwrap();
        ledger.change_data(&alice, first.id, &[0x03]).unwrap();
        ledger.change_owner(&alice, first.id, &bob).unwrap();
        ledger
    }

    #[test]
    fn replay_matches_live_table() {
        let ledger = populated_ledger();

        let result = ReplayEngine::replay(&ledger).unwrap();
        assert_eq!(result.applied_events, 4);
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0], ledger.record(RecordId::new(0)).unwrap());
        assert_eq!(result.records[1], ledger.record(RecordId::new(1)).unwrap());

        assert!(ReplayEngine::verify_convergence(&ledger).unwrap());
    }

    #[test]
    fn replay_empty_log() {
        let ledger = InMemoryLedger::default();
        let result = ReplayEngine::replay(&ledger).unwrap();
        assert_eq!(result.applied_events, 0);
        assert!(result.records.is_empty());
        assert!(ReplayEngine::verify_convergence(&ledger).unwrap());
    }

    #[test]
    fn replay_rejects_gapped_ids() {
        let ledger = InMemoryLedger::default();
        ledger
            .add_record(&owner("alice"), &[0x01], Mutability::Mutable)
            .unwrap();

        let mut events = ledger.read_all().unwrap();
        if let AuditEvent::RecordAdded(e) = &mut events[0] {
            e.id = RecordId::new(3);
        }

        let error = ReplayEngine::replay_events(&events).unwrap_err();
        assert!(matches!(error, LedgerError::IntegrityViolation { seq: 1, .. }));
    }

    #[test]
    fn replay_rejects_mutation_of_immutable() {
        let ledger = InMemoryLedger::default();
        let alice = owner("alice");
        let added = ledger
            .add_record(&alice, &[0x01], Mutability::Immutable)
            .unwrap();

        let mut events = ledger.read_all().unwrap();
        events.push(AuditEvent::DataChanged(DataChanged {
            seq: 2,
            event_hash: [0; 32],
            prev_hash: Some(added.event_hash),
            timestamp: TemporalAnchor::now(0),
            actor: alice,
            id: added.id,
            old_payload: added.payload,
            new_payload: Payload::parse_hex("0xff").unwrap(),
        }));

        let error = ReplayEngine::replay_events(&events).unwrap_err();
        assert!(matches!(
            error,
            LedgerError::IntegrityViolation { seq: 2, reason } if reason.contains("immutable")
        ));
    }

    #[test]
    fn replay_rejects_unauthorized_mutation() {
        let ledger = InMemoryLedger::default();
        let alice = owner("alice");
        let added = ledger
            .add_record(&alice, &[0x01], Mutability::Mutable)
            .unwrap();

        let mut events = ledger.read_all().unwrap();
        events.push(AuditEvent::DataChanged(DataChanged {
            seq: 2,
            event_hash: [0; 32],
            prev_hash: Some(added.event_hash),
            timestamp: TemporalAnchor::now(0),
            actor: owner("mallory"),
            id: added.id,
            old_payload: added.payload,
            new_payload: Payload::parse_hex("0xff").unwrap(),
        }));

        let error = ReplayEngine::replay_events(&events).unwrap_err();
        assert!(matches!(
            error,
            LedgerError::IntegrityViolation { seq: 2, reason } if reason.contains("non-owner")
        ));
    }

    #[test]
    fn replay_rejects_stale_old_value() {
        let ledger = InMemoryLedger::default();
        let alice = owner("alice");
        let added = ledger
            .add_record(&alice, &[0x01], Mutability::Mutable)
            .unwrap();
        ledger.change_data(&alice, added.id, &[0x02]).unwrap();

        let mut events = ledger.read_all().unwrap();
        if let AuditEvent::DataChanged(e) = &mut events[1] {
            e.old_payload = Payload::parse_hex("0x99").unwrap();
        }

        let error = ReplayEngine::replay_events(&events).unwrap_err();
        assert!(matches!(
            error,
            LedgerError::IntegrityViolation { seq: 2, reason } if reason.contains("old payload")
        ));
    }
}
