//! Append-only record ledger for the Owned-Record Ledger (ORL).
//!
//! This crate is the heart of ORL. It provides:
//! - The record table: dense-id records with owner, payload, and mutability
//! - Hash-linked audit events for every mutation
//! - `LedgerWriter` / `LedgerReader` trait boundaries
//! - `InMemoryLedger` implementation for tests and embedding
//! - Deterministic replay of the audit log back into the record table
//! - Projection builders (per-record history, per-owner holdings)
//! - Audit log validation (hash chain, sequence, id density, authorization)

pub mod error;
pub mod events;
pub mod memory;
pub mod projection;
pub mod replay;
pub mod traits;
pub mod validation;

pub use error::LedgerError;
pub use events::{AuditEvent, AuditRef, DataChanged, OwnerChanged, Record, RecordAdded};
pub use memory::InMemoryLedger;
pub use projection::{
    HistoryEntry, HoldingsProjection, ProjectionBuilder, RecordHistoryProjection,
};
pub use replay::{ReplayEngine, ReplayResult};
pub use traits::{LedgerReader, LedgerWriter};
pub use validation::{AuditValidator, ValidationReport, Violation, ViolationKind};
