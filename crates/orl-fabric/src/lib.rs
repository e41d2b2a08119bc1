//! Live event feed for the Owned-Record Ledger (ORL).
//!
//! Fans committed audit events out to subscribers through per-subscriber
//! broadcast channels with optional filtering. The feed is notification-only:
//! the audit log in `orl-ledger` remains the source of truth, and a consumer
//! that falls behind re-reads the log rather than relying on the feed.

pub mod feed;

pub use feed::{AuditFeed, EventStream, FeedConfig, FeedFilter};
