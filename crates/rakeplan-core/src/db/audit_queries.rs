//! Audit log queries. The table is append-only; triggers reject updates and
//! deletes.

use jiff::Timestamp;
use rusqlite::{params, Connection, Row};

use super::utils::{parse_json, parse_timestamp};
use crate::{
    error::{DatabaseResultExt, Result},
    models::AuditEntry,
};

const INSERT_AUDIT_SQL: &str =
    "INSERT INTO audit_log (user_name, created_at, reason, change_json) VALUES (?1, ?2, ?3, ?4)";

const SELECT_AUDIT_SQL: &str =
    "SELECT id, user_name, created_at, reason, change_json FROM audit_log ORDER BY id ASC";

/// Insert an entry on any connection or open transaction.
pub(super) fn insert_audit_entry(
    conn: &Connection,
    user: &str,
    reason: &str,
    change: &serde_json::Value,
    now: Timestamp,
) -> Result<AuditEntry> {
    let change_json = serde_json::to_string(change)?;
    conn.execute(
        INSERT_AUDIT_SQL,
        params![user, now.to_string(), reason, change_json],
    )
    .db_context("Failed to insert audit entry")?;

    Ok(AuditEntry {
        id: conn.last_insert_rowid() as u64,
        user: user.to_string(),
        timestamp: now,
        reason: reason.to_string(),
        change: change.clone(),
    })
}

impl super::Database {
    fn build_audit_from_row(row: &Row<'_>) -> rusqlite::Result<AuditEntry> {
        let created_at: String = row.get(2)?;
        let change_json: String = row.get(4)?;
        Ok(AuditEntry {
            id: row.get::<_, i64>(0)? as u64,
            user: row.get(1)?,
            timestamp: parse_timestamp(2, &created_at)?,
            reason: row.get(3)?,
            change: parse_json(4, &change_json)?,
        })
    }

    /// Appends an entry. The caller validates the reason.
    pub fn append_audit(
        &self,
        user: &str,
        reason: &str,
        change: &serde_json::Value,
    ) -> Result<AuditEntry> {
        insert_audit_entry(&self.connection, user, reason, change, Timestamp::now())
    }

    /// All entries in insertion order.
    pub fn list_audit(&self) -> Result<Vec<AuditEntry>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_AUDIT_SQL)
            .db_context("Failed to prepare audit query")?;

        let entries = stmt
            .query_map([], Self::build_audit_from_row)
            .db_context("Failed to query audit log")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to read audit log")?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::db::Database;

    #[test]
    fn test_entries_come_back_in_insertion_order() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(temp_dir.path().join("test.db")).unwrap();

        for reason in ["first", "second", "third"] {
            db.append_audit("planner", reason, &serde_json::json!({"rake_id": "R123"}))
                .unwrap();
        }

        let entries = db.list_audit().unwrap();
        let reasons: Vec<_> = entries.iter().map(|e| e.reason.as_str()).collect();
        assert_eq!(reasons, ["first", "second", "third"]);
        assert!(entries.windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(entries[0].change["rake_id"], "R123");
    }

    #[test]
    fn test_audit_rows_cannot_be_rewritten() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(temp_dir.path().join("test.db")).unwrap();
        db.append_audit("planner", "reason", &serde_json::Value::Null)
            .unwrap();

        assert!(db
            .connection
            .execute("UPDATE audit_log SET reason = 'edited'", [])
            .is_err());
        assert!(db.connection.execute("DELETE FROM audit_log", []).is_err());
        assert_eq!(db.list_audit().unwrap().len(), 1);
    }

    #[test]
    fn test_blank_reason_is_rejected_by_schema() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(temp_dir.path().join("test.db")).unwrap();
        assert!(db
            .append_audit("planner", "  ", &serde_json::Value::Null)
            .is_err());
    }
}
