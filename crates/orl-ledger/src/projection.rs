use serde::{Deserialize, Serialize};

use orl_types::{AuditEventKind, OwnerId, RecordId, TemporalAnchor};

use crate::error::LedgerError;
use crate::events::AuditEvent;
use crate::traits::LedgerReader;

/// Row in a record's mutation history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub seq: u64,
    pub event_hash: [u8; 32],
    pub kind: AuditEventKind,
    pub timestamp: TemporalAnchor,
    pub actor: OwnerId,
    pub summary: String,
}

/// Full mutation history of one record, oldest first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordHistoryProjection {
    pub id: RecordId,
    pub entries: Vec<HistoryEntry>,
}

/// Records currently held by one owner, ascending by id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingsProjection {
    pub owner: OwnerId,
    pub records: Vec<RecordId>,
}

/// Deterministic projection builders over the audit log.
pub struct ProjectionBuilder;

impl ProjectionBuilder {
    /// Every audit event that touched the given record, oldest first.
    pub fn record_history<R: LedgerReader>(
        reader: &R,
        id: RecordId,
    ) -> Result<RecordHistoryProjection, LedgerError> {
        // Unknown ids surface as an error, not an empty history.
        reader.record(id)?;

        let events = reader.read_all()?;
        let entries = events
            .iter()
            .filter(|event| event.record_id() == id)
            .map(|event| {
                let summary = match event {
                    AuditEvent::RecordAdded(e) => format!(
                        "created {} with payload {}",
                        e.mutability,
                        e.payload.short_hex()
                    ),
                    AuditEvent::DataChanged(e) => format!(
                        "payload {} changed to {}",
                        e.old_payload.short_hex(),
                        e.new_payload.short_hex()
                    ),
                    AuditEvent::OwnerChanged(e) => {
                        format!("transferred from {} to {}", e.old_owner, e.new_owner)
                    }
                };
                HistoryEntry {
                    seq: event.seq(),
                    event_hash: event.event_hash(),
                    kind: event.kind(),
                    timestamp: event.timestamp(),
                    actor: event.actor().clone(),
                    summary,
                }
            })
            .collect();

        Ok(RecordHistoryProjection { id, entries })
    }

    /// Ids currently owned by `owner`, derived from the audit log alone.
    pub fn holdings<R: LedgerReader>(
        reader: &R,
        owner: &OwnerId,
    ) -> Result<HoldingsProjection, LedgerError> {
        let events = reader.read_all()?;

        let mut owners: Vec<OwnerId> = Vec::new();
        for event in &events {
            match event {
                AuditEvent::RecordAdded(e) => owners.push(e.actor.clone()),
                AuditEvent::OwnerChanged(e) => {
                    if let Some(slot) = owners.get_mut(e.id.index()) {
                        *slot = e.new_owner.clone();
                    }
                }
                AuditEvent::DataChanged(_) => {}
            }
        }

        let records = owners
            .iter()
            .enumerate()
            .filter(|(_, current)| *current == owner)
            .map(|(index, _)| RecordId::new(index as u64))
            .collect();

        Ok(HoldingsProjection {
            owner: owner.clone(),
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use orl_types::Mutability;

    use crate::error::LedgerError;
    use crate::memory::InMemoryLedger;
    use crate::traits::LedgerWriter;

    use super::*;

    fn owner(label: &str) -> OwnerId {
        OwnerId::from_label(label)
    }

    #[test]
    fn history_tracks_single_record() {
        let ledger = InMemoryLedger::default();
        let alice = owner("alice");
        let bob = owner("bob");

        let first = ledger
            .add_record(&alice, &[0x01], Mutability::Mutable)
            .unwrap();
        ledger
            .add_record(&bob, &[0x02], Mutability::Mutable)
            .unwrap();
        ledger.change_data(&alice, first.id, &[0x03]).unwrap();
        ledger.change_owner(&alice, first.id, &bob).unwrap();

        let history = ProjectionBuilder::record_history(&ledger, first.id).unwrap();
        assert_eq!(history.id, first.id);
        assert_eq!(history.entries.len(), 3);
        assert_eq!(history.entries[0].kind, AuditEventKind::RecordAdded);
        assert_eq!(history.entries[1].kind, AuditEventKind::DataChanged);
        assert_eq!(history.entries[2].kind, AuditEventKind::OwnerChanged);
        assert_eq!(history.entries[0].seq, 1);
        assert_eq!(history.entries[1].seq, 3);
        assert!(history.entries.iter().all(|e| e.actor == alice));
    }

    #[test]
    fn history_of_unknown_record_errors() {
        let ledger = InMemoryLedger::default();
        let id = RecordId::new(7);
        let error = ProjectionBuilder::record_history(&ledger, id).unwrap_err();
        assert_eq!(error, LedgerError::RecordNotFound { id });
    }

    #[test]
    fn holdings_follow_transfers() {
        let ledger = InMemoryLedger::default();
        let alice = owner("alice");
        let bob = owner("bob");

        let r0 = ledger
            .add_record(&alice, &[0x01], Mutability::Mutable)
            .unwrap();
        let r1 = ledger
            .add_record(&alice, &[0x02], Mutability::Mutable)
            .unwrap();
        let r2 = ledger
            .add_record(&bob, &[0x03], Mutability::Immutable)
            .unwrap();
        ledger.change_owner(&alice, r1.id, &bob).unwrap();

        let alices = ProjectionBuilder::holdings(&ledger, &alice).unwrap();
        assert_eq!(alices.records, vec![r0.id]);

        let bobs = ProjectionBuilder::holdings(&ledger, &bob).unwrap();
        assert_eq!(bobs.records, vec![r1.id, r2.id]);

        let carols = ProjectionBuilder::holdings(&ledger, &owner("carol")).unwrap();
        assert!(carols.records.is_empty());
    }

    #[test]
    fn projections_are_deterministic() {
        let ledger = InMemoryLedger::default();
        let alice = owner("alice");
        let added = ledger
            .add_record(&alice, &[0x01], Mutability::Mutable)
            .unwrap();
        ledger.change_data(&alice, added.id, &[0x02]).unwrap();

        let first = ProjectionBuilder::record_history(&ledger, added.id).unwrap();
        let second = ProjectionBuilder::record_history(&ledger, added.id).unwrap();
        assert_eq!(first, second);

        let h1 = ProjectionBuilder::holdings(&ledger, &alice).unwrap();
        let h2 = ProjectionBuilder::holdings(&ledger, &alice).unwrap();
        assert_eq!(h1, h2);
    }
}
