//! Collection wrapper types for displaying groups of domain objects.

use std::fmt;

use crate::models::AuditEntry;

/// Newtype wrapper for displaying the audit log, oldest entry first.
///
/// # Examples
///
/// ```rust
/// use rakeplan_core::{display::AuditEntries, models::AuditEntry};
/// use jiff::Timestamp;
///
/// let entry = AuditEntry {
///     id: 1,
///     user: "dispatcher".to_string(),
///     timestamp: Timestamp::now(),
///     reason: "Moved rake to Bokaro siding".to_string(),
///     change: serde_json::Value::Null,
/// };
/// let output = AuditEntries(vec![entry]).to_string();
/// assert!(output.contains("Moved rake to Bokaro siding"));
/// ```
pub struct AuditEntries(pub Vec<AuditEntry>);

impl fmt::Display for AuditEntries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No audit entries recorded.");
        }
        for (idx, entry) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use serde_json::json;

    use super::*;

    fn create_test_entry(id: u64, reason: &str) -> AuditEntry {
        AuditEntry {
            id,
            user: "anonymous".to_string(),
            timestamp: Timestamp::from_second(1_759_622_400).unwrap(),
            reason: reason.to_string(),
            change: json!({"row_id": 3}),
        }
    }

    #[test]
    fn test_empty_audit_log() {
        assert_eq!(
            AuditEntries(vec![]).to_string(),
            "No audit entries recorded.\n"
        );
    }

    #[test]
    fn test_entries_keep_their_order() {
        let entries = AuditEntries(vec![
            create_test_entry(1, "First override"),
            create_test_entry(2, "Second override"),
        ]);
        let output = entries.to_string();

        let first = output.find("First override").unwrap();
        let second = output.find("Second override").unwrap();
        assert!(first < second);
        assert!(output.contains("### #2 anonymous"));
        assert!(output.contains("\"row_id\": 3"));
    }
}
