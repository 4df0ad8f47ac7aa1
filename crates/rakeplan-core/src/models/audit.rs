//! Audit trail entries for manual plan overrides.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// An immutable record of who changed what, when and why.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEntry {
    /// Insertion-ordered identifier
    pub id: u64,

    pub user: String,

    /// Time the entry was written (UTC)
    pub timestamp: Timestamp,

    /// Justification supplied by the user, never empty
    pub reason: String,

    /// Free-form description of the change
    pub change: serde_json::Value,
}
