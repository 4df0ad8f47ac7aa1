//! Audit log operations for the Planner.

use super::Planner;
use crate::{error::Result, models::AuditEntry, params::AppendAudit};

impl Planner {
    /// Appends an entry to the audit log.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::InvalidInput` when the reason is blank.
    pub async fn append_audit(&self, params: &AppendAudit) -> Result<AuditEntry> {
        let (user, reason) = params.validate()?;
        let change = params.change.clone();

        let entry = self
            .with_db(move |db| db.append_audit(&user, &reason, &change))
            .await?;
        log::info!("audit #{} by {}: {}", entry.id, entry.user, entry.reason);
        Ok(entry)
    }

    /// All audit entries in insertion order.
    pub async fn list_audit(&self) -> Result<Vec<AuditEntry>> {
        self.with_db(|db| db.list_audit()).await
    }
}
