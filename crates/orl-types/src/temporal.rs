use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Timestamp stamped on every audit event.
///
/// Wall clocks stall and occasionally step backwards, so event ordering
/// cannot rest on `physical_ms` alone. The logical counter breaks ties
/// within a millisecond and absorbs clock regressions; the node id
/// distinguishes writing processes that share a log.
///
/// Field order is significant: the derived `Ord` compares `physical_ms`,
/// then `logical`, then `node_id`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TemporalAnchor {
    /// Milliseconds since the UNIX epoch when the event was appended.
    pub physical_ms: u64,
    /// Disambiguates events that land in the same millisecond.
    pub logical: u32,
    /// Identifies the writing process.
    pub node_id: u16,
}

impl TemporalAnchor {
    pub fn new(physical_ms: u64, logical: u32, node_id: u16) -> Self {
        Self {
            physical_ms,
            logical,
            node_id,
        }
    }

    /// Anchor for the current wall-clock time.
    pub fn now(node_id: u16) -> Self {
        let physical_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Self {
            physical_ms,
            logical: 0,
            node_id,
        }
    }

    /// Anchor for the event appended directly after `self`.
    ///
    /// Takes a fresh wall-clock reading when the clock has moved on.
    /// Otherwise stays at `self.physical_ms` and bumps the counter, so the
    /// result is strictly greater than `self` even across clock steps.
    pub fn successor(&self, node_id: u16) -> Self {
        let now = Self::now(node_id);
        if now.physical_ms > self.physical_ms {
            now
        } else {
            Self {
                physical_ms: self.physical_ms,
                logical: self.logical.saturating_add(1),
                node_id,
            }
        }
    }
}

impl fmt::Display for TemporalAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}@{}", self.physical_ms, self.logical, self.node_id)
    }
}
