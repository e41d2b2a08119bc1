use tracing::info;

use orl_fabric::{AuditFeed, EventStream, FeedConfig, FeedFilter};
use orl_ledger::{
    AuditEvent, AuditRef, AuditValidator, HoldingsProjection, InMemoryLedger, LedgerReader,
    ProjectionBuilder, Record, RecordHistoryProjection, ReplayEngine, ReplayResult,
    ValidationReport,
};
use orl_types::{OwnerId, RecordId};

use crate::error::{SdkError, SdkResult};
use crate::session::Session;

/// High-level ORL handle: ledger, audit log, projections, and live feed.
///
/// Reads go through the handle directly. Mutations go through a
/// [`Session`], which binds the caller identity once instead of threading
/// it through every call.
pub struct Orl {
    pub(crate) ledger: InMemoryLedger,
    pub(crate) feed: AuditFeed,
}

impl Orl {
    /// Initialize an empty ledger with default configuration.
    pub fn init() -> Self {
        Self::with_config(0, FeedConfig::default())
    }

    /// Initialize an empty ledger with an explicit node id and feed config.
    pub fn with_config(node_id: u16, feed: FeedConfig) -> Self {
        Self {
            ledger: InMemoryLedger::new(node_id),
            feed: AuditFeed::new(feed),
        }
    }

    /// Rebuild a handle from a serialized audit log.
    ///
    /// The chain is verified and replayed; a tampered or impossible log is
    /// rejected. Restored events are not re-published to the feed.
    pub fn restore(events: Vec<AuditEvent>, node_id: u16) -> SdkResult<Self> {
        let ledger = InMemoryLedger::restore(events, node_id)?;
        Ok(Self {
            ledger,
            feed: AuditFeed::default(),
        })
    }

    /// Serialize the full audit log as JSON.
    pub fn to_json(&self) -> SdkResult<String> {
        let events = self.ledger.read_all()?;
        serde_json::to_string_pretty(&events).map_err(|e| SdkError::Serialization(e.to_string()))
    }

    /// Rebuild a handle from an audit log serialized with [`Orl::to_json`].
    pub fn from_json(json: &str) -> SdkResult<Self> {
        let events: Vec<AuditEvent> =
            serde_json::from_str(json).map_err(|e| SdkError::Serialization(e.to_string()))?;
        info!(events = events.len(), "importing audit log");
        Self::restore(events, 0)
    }

    /// Bind a caller identity for mutations.
    pub fn session(&self, caller: OwnerId) -> Session<'_> {
        Session::new(self, caller)
    }

    // ---- Record lookups ----

    pub fn record(&self, id: RecordId) -> SdkResult<Record> {
        Ok(self.ledger.record(id)?)
    }

    pub fn record_count(&self) -> SdkResult<u64> {
        Ok(self.ledger.record_count()?)
    }

    // ---- Audit log ----

    pub fn head(&self) -> SdkResult<Option<AuditRef>> {
        Ok(self.ledger.head()?)
    }

    pub fn audit_log(&self) -> SdkResult<Vec<AuditEvent>> {
        Ok(self.ledger.read_all()?)
    }

    pub fn audit_range(&self, from_seq: u64, to_seq: u64) -> SdkResult<Vec<AuditEvent>> {
        Ok(self.ledger.read_range(from_seq, to_seq)?)
    }

    pub fn event(&self, hash: [u8; 32]) -> SdkResult<Option<AuditEvent>> {
        Ok(self.ledger.get_by_hash(hash)?)
    }

    pub fn event_count(&self) -> SdkResult<u64> {
        Ok(self.ledger.event_count()?)
    }

    // ---- Projections ----

    pub fn history(&self, id: RecordId) -> SdkResult<RecordHistoryProjection> {
        Ok(ProjectionBuilder::record_history(&self.ledger, id)?)
    }

    pub fn holdings(&self, owner: &OwnerId) -> SdkResult<HoldingsProjection> {
        Ok(ProjectionBuilder::holdings(&self.ledger, owner)?)
    }

    // ---- Integrity ----

    /// Full audit log validation report.
    pub fn verify(&self) -> SdkResult<ValidationReport> {
        Ok(AuditValidator::validate(&self.ledger)?)
    }

    /// Replay the audit log into a fresh record table.
    pub fn replay(&self) -> SdkResult<ReplayResult> {
        Ok(ReplayEngine::replay(&self.ledger)?)
    }

    /// Returns `true` if replaying the log reproduces the live table.
    pub fn verify_convergence(&self) -> SdkResult<bool> {
        Ok(ReplayEngine::verify_convergence(&self.ledger)?)
    }

    // ---- Live feed ----

    /// Subscribe to committed audit events matching the filter.
    pub fn subscribe(&self, filter: FeedFilter) -> EventStream {
        self.feed.subscribe(filter)
    }
}

impl Default for Orl {
    fn default() -> Self {
        Self::init()
    }
}
