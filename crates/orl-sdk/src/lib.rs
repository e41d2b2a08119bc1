//! High-level SDK for the Owned-Record Ledger.
//!
//! Provides a unified API over the record ledger, its audit log, the
//! projection builders, and the live event feed. This is the main entry
//! point for applications embedding ORL.

pub mod error;
pub mod orl;
pub mod session;

pub use error::{SdkError, SdkResult};
pub use orl::Orl;
pub use session::Session;

// Re-export key types
pub use orl_types::{AuditEventKind, IdentityMaterial, Mutability, OwnerId, Payload, RecordId};
pub use orl_ledger::{
    AuditEvent, AuditRef, DataChanged, HistoryEntry, HoldingsProjection, OwnerChanged, Record,
    RecordAdded, RecordHistoryProjection, ReplayResult, ValidationReport, Violation,
    ViolationKind,
};
pub use orl_fabric::{EventStream, FeedConfig, FeedFilter};
