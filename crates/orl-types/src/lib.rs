//! Foundation types for the Owned-Record Ledger (ORL).
//!
//! This crate provides the identity, payload, and temporal types used
//! throughout the ORL system. Every other ORL crate depends on `orl-types`.
//!
//! # Key Types
//!
//! - [`RecordId`] — Dense, zero-based index of a record in the ledger
//! - [`OwnerId`] — Persistent cryptographic identity derived from key material
//! - [`Payload`] — Fixed-width 32-byte record data, zero-extended on the right
//! - [`Mutability`] — Whether a record admits payload and owner changes
//! - [`AuditEventKind`] — Classification of entries in the audit log
//! - [`TemporalAnchor`] — Hybrid logical timestamp for event ordering

pub mod error;
pub mod event;
pub mod identity;
pub mod payload;
pub mod record;
pub mod temporal;

pub use error::TypeError;
pub use event::AuditEventKind;
pub use identity::{IdentityMaterial, OwnerId};
pub use payload::{Payload, PAYLOAD_WIDTH};
pub use record::{Mutability, RecordId};
pub use temporal::TemporalAnchor;
