use serde::{Deserialize, Serialize};

use orl_types::{Mutability, OwnerId, Payload, RecordId};

use crate::error::LedgerError;
use crate::events::{compute_event_hash, AuditEvent};
use crate::traits::LedgerReader;

/// Result of audit log validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub event_count: u64,
    pub record_count: u64,
    pub hash_chain_valid: bool,
    pub sequence_monotonic: bool,
    pub ids_dense: bool,
    pub mutations_authorized: bool,
    pub immutability_respected: bool,
    pub old_values_consistent: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific integrity violation detected during validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub seq: u64,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationKind {
    SequenceGap,
    HashChainBreak,
    HashMismatch,
    NonDenseId,
    UnknownRecord,
    UnauthorizedMutation,
    ImmutableMutation,
    StaleOldValue,
}

/// Shadow of one record while walking the log.
struct ShadowRecord {
    owner: OwnerId,
    payload: Payload,
    mutability: Mutability,
}

/// Audit log integrity validator.
///
/// Unlike [`crate::replay::ReplayEngine`], which stops at the first
/// impossible event, the validator walks the whole log and reports every
/// violation it finds.
pub struct AuditValidator;

impl AuditValidator {
    /// Validate a ledger's full audit log.
    pub fn validate<R: LedgerReader>(reader: &R) -> Result<ValidationReport, LedgerError> {
        let events = reader.read_all()?;
        Ok(Self::validate_events(&events))
    }

    /// Validate a standalone event sequence.
    pub fn validate_events(events: &[AuditEvent]) -> ValidationReport {
        let mut violations = Vec::new();
        let mut hash_chain_valid = true;
        let mut sequence_monotonic = true;
        let mut ids_dense = true;
        let mut mutations_authorized = true;
        let mut immutability_respected = true;
        let mut old_values_consistent = true;
        let mut shadow: Vec<ShadowRecord> = Vec::new();

        for (index, event) in events.iter().enumerate() {
            let expected_seq = (index + 1) as u64;
            if event.seq() != expected_seq {
                sequence_monotonic = false;
                violations.push(Violation {
                    seq: event.seq(),
                    kind: ViolationKind::SequenceGap,
                    description: format!("expected seq {expected_seq}, got {}", event.seq()),
                });
            }

            // Check prev_hash link
            let expected_prev = if index == 0 {
                None
            } else {
                Some(events[index - 1].event_hash())
            };
            if event.prev_hash() != expected_prev {
                hash_chain_valid = false;
                violations.push(Violation {
                    seq: event.seq(),
                    kind: ViolationKind::HashChainBreak,
                    description: "previous hash link mismatch".into(),
                });
            }

            // Recompute and verify hash
            if let Ok(computed) = compute_event_hash(event) {
                if computed != event.event_hash() {
                    hash_chain_valid = false;
                    violations.push(Violation {
                        seq: event.seq(),
                        kind: ViolationKind::HashMismatch,
                        description: "event hash does not match computed".into(),
                    });
                }
            }

            // Kind-specific checks against the replayed shadow state
            match event {
                AuditEvent::RecordAdded(e) => {
                    let expected = RecordId::new(shadow.len() as u64);
                    if e.id != expected {
                        ids_dense = false;
                        violations.push(Violation {
                            seq: e.seq,
                            kind: ViolationKind::NonDenseId,
                            description: format!("expected id {expected}, got {}", e.id),
                        });
                    }
                    shadow.push(ShadowRecord {
                        owner: e.actor.clone(),
                        payload: e.payload,
                        mutability: e.mutability,
                    });
                }
                AuditEvent::DataChanged(e) => {
                    match shadow.get_mut(e.id.index()) {
                        None => {
                            mutations_authorized = false;
                            violations.push(Violation {
                                seq: e.seq,
                                kind: ViolationKind::UnknownRecord,
                                description: format!("payload change on unknown {}", e.id),
                            });
                        }
                        Some(record) => {
                            if !record.mutability.is_mutable() {
                                immutability_respected = false;
                                violations.push(Violation {
                                    seq: e.seq,
                                    kind: ViolationKind::ImmutableMutation,
                                    description: format!("immutable {} was mutated", e.id),
                                });
                            }
                            if record.owner != e.actor {
                                mutations_authorized = false;
                                violations.push(Violation {
                                    seq: e.seq,
                                    kind: ViolationKind::UnauthorizedMutation,
                                    description: format!(
                                        "payload change on {} by non-owner {}",
                                        e.id, e.actor
                                    ),
                                });
                            }
                            if record.payload != e.old_payload {
                                old_values_consistent = false;
                                violations.push(Violation {
                                    seq: e.seq,
                                    kind: ViolationKind::StaleOldValue,
                                    description: format!(
                                        "old payload of {} does not match history",
                                        e.id
                                    ),
                                });
                            }
                            // Keep walking with the recorded outcome.
                            record.payload = e.new_payload;
                        }
                    }
                }
                AuditEvent::OwnerChanged(e) => {
                    match shadow.get_mut(e.id.index()) {
                        None => {
                            mutations_authorized = false;
                            violations.push(Violation {
                                seq: e.seq,
                                kind: ViolationKind::UnknownRecord,
                                description: format!("owner change on unknown {}", e.id),
                            });
                        }
                        Some(record) => {
                            if !record.mutability.is_mutable() {
                                immutability_respected = false;
                                violations.push(Violation {
                                    seq: e.seq,
                                    kind: ViolationKind::ImmutableMutation,
                                    description: format!("immutable {} was transferred", e.id),
                                });
                            }
                            if record.owner != e.actor {
                                mutations_authorized = false;
                                violations.push(Violation {
                                    seq: e.seq,
                                    kind: ViolationKind::UnauthorizedMutation,
                                    description: format!(
                                        "owner change on {} by non-owner {}",
                                        e.id, e.actor
                                    ),
                                });
                            }
                            if record.owner != e.old_owner {
                                old_values_consistent = false;
                                violations.push(Violation {
                                    seq: e.seq,
                                    kind: ViolationKind::StaleOldValue,
                                    description: format!(
                                        "old owner of {} does not match history",
                                        e.id
                                    ),
                                });
                            }
                            record.owner = e.new_owner.clone();
                        }
                    }
                }
            }
        }

        ValidationReport {
            event_count: events.len() as u64,
            record_count: shadow.len() as u64,
            hash_chain_valid,
            sequence_monotonic,
            ids_dense,
            mutations_authorized,
            immutability_respected,
            old_values_consistent,
            violations,
        }
    }
}
