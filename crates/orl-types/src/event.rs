use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of entries in the audit log.
///
/// Every ledger mutation appends exactly one audit entry, and each entry is
/// one of these kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditEventKind {
    /// A record was created.
    RecordAdded,
    /// A mutable record's payload was replaced.
    DataChanged,
    /// A mutable record was transferred to a new owner.
    OwnerChanged,
}

impl fmt::Display for AuditEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::RecordAdded => "RecordAdded",
            Self::DataChanged => "DataChanged",
            Self::OwnerChanged => "OwnerChanged",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_display() {
        assert_eq!(format!("{}", AuditEventKind::RecordAdded), "RecordAdded");
        assert_eq!(format!("{}", AuditEventKind::DataChanged), "DataChanged");
        assert_eq!(format!("{}", AuditEventKind::OwnerChanged), "OwnerChanged");
    }

    #[test]
    fn serde_roundtrip() {
        let kind = AuditEventKind::OwnerChanged;
        let json = serde_json::to_string(&kind).unwrap();
        let parsed: AuditEventKind = serde_json::from_str(&json).unwrap();
        assert_eq!(kind, parsed);
    }
}
