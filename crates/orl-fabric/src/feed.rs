use std::sync::RwLock;

use tokio::sync::broadcast;
use tracing::debug;

use orl_ledger::AuditEvent;
use orl_types::{AuditEventKind, RecordId};

/// Filter for subscribing to a subset of audit events.
#[derive(Clone, Debug, Default)]
pub struct FeedFilter {
    /// If set, only events touching these records are delivered.
    pub records: Option<Vec<RecordId>>,
    /// If set, only events of these kinds are delivered.
    pub kinds: Option<Vec<AuditEventKind>>,
    /// If set, only events with a sequence number above this are delivered.
    pub after_seq: Option<u64>,
}

impl FeedFilter {
    /// Returns `true` if the given event matches this filter.
    pub fn matches(&self, event: &AuditEvent) -> bool {
        if let Some(ref records) = self.records {
            if !records.contains(&event.record_id()) {
                return false;
            }
        }
        if let Some(ref kinds) = self.kinds {
            if !kinds.contains(&event.kind()) {
                return false;
            }
        }
        if let Some(after_seq) = self.after_seq {
            if event.seq() <= after_seq {
                return false;
            }
        }
        true
    }
}

/// A broadcast channel receiver for audit events.
pub type EventStream = broadcast::Receiver<AuditEvent>;

/// Internal subscriber: a filter paired with a broadcast sender.
struct Subscriber {
    filter: FeedFilter,
    sender: broadcast::Sender<AuditEvent>,
}

/// Configuration for the [`AuditFeed`].
#[derive(Clone, Debug)]
pub struct FeedConfig {
    /// Capacity of per-subscriber broadcast channels.
    pub channel_capacity: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
        }
    }
}

/// Fan-out feed that delivers committed audit events to subscribers.
///
/// Delivery is best-effort. A subscriber that lags past its channel
/// capacity loses the oldest notifications and should re-read the audit
/// log; nothing in the ledger depends on delivery having happened.
pub struct AuditFeed {
    subscribers: RwLock<Vec<Subscriber>>,
    config: FeedConfig,
}

impl AuditFeed {
    pub fn new(config: FeedConfig) -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            config,
        }
    }

    /// Register a new subscriber with the given filter.
    /// Returns a broadcast receiver for the matching events.
    pub fn subscribe(&self, filter: FeedFilter) -> EventStream {
        let (tx, rx) = broadcast::channel(self.config.channel_capacity);
        let sub = Subscriber { filter, sender: tx };
        self.subscribers
            .write()
            .expect("feed lock poisoned")
            .push(sub);
        rx
    }

    /// Deliver a committed event to all matching subscribers.
    /// Subscribers whose channels are closed are pruned.
    pub fn publish(&self, event: &AuditEvent) {
        let mut subs = self.subscribers.write().expect("feed lock poisoned");
        subs.retain(|sub| {
            if sub.filter.matches(event) {
                // If send fails (no receivers), the subscriber is stale.
                sub.sender.send(event.clone()).is_ok()
            } else {
                // Keep non-matching subscribers; they may match future events.
                // Only prune if the channel itself is closed.
                sub.sender.receiver_count() > 0
            }
        });
        debug!(seq = event.seq(), kind = %event.kind(), subscribers = subs.len(), "event published");
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .expect("feed lock poisoned")
            .len()
    }
}

impl Default for AuditFeed {
    fn default() -> Self {
        Self::new(FeedConfig::default())
    }
}
