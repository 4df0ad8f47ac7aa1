//! Plan store queries.

use jiff::{civil::Date, Timestamp};
use rusqlite::{params, Connection, OptionalExtension};

use super::{
    audit_queries::insert_audit_entry,
    utils::{parse_json, parse_timestamp},
};
use crate::{
    error::{DatabaseResultExt, PlannerError, Result},
    models::{AuditEntry, Plan, PlanRow, PlanSummary, RowEdit},
};

const SELECT_PLAN_SQL: &str =
    "SELECT revision, locked, generated_at, rows_json FROM plans WHERE plan_date = ?1";

const UPSERT_PLAN_SQL: &str = "INSERT INTO plans (plan_date, revision, locked, generated_at, rows_json) \
     VALUES (?1, ?2, 0, ?3, ?4) \
     ON CONFLICT(plan_date) DO UPDATE SET revision = excluded.revision, \
     generated_at = excluded.generated_at, rows_json = excluded.rows_json";

const LOCK_PLAN_SQL: &str = "UPDATE plans SET locked = 1 WHERE plan_date = ?1";

/// Read the plan for `date` on any connection or open transaction.
pub(super) fn select_plan(conn: &Connection, date: Date) -> Result<Option<Plan>> {
    conn.query_row(SELECT_PLAN_SQL, params![date.to_string()], |row| {
        let revision: u32 = row.get(0)?;
        let generated_at: String = row.get(2)?;
        let rows_json: String = row.get(3)?;
        let rows: Vec<PlanRow> = parse_json(3, &rows_json)?;

        Ok(Plan {
            date,
            plan_id: Plan::make_id(date, revision),
            revision,
            locked: row.get(1)?,
            generated_at: parse_timestamp(2, &generated_at)?,
            summary: PlanSummary::from_rows(&rows),
            rows,
        })
    })
    .optional()
    .db_context("Failed to query plan")
}

/// Write `rows` as the next revision of the plan for `date`.
pub(super) fn write_next_revision(
    conn: &Connection,
    date: Date,
    current: Option<&Plan>,
    mut rows: Vec<PlanRow>,
) -> Result<Plan> {
    if let Some(plan) = current.filter(|plan| plan.locked) {
        return Err(PlannerError::PlanLocked { date: plan.date });
    }

    Plan::normalize_rows(&mut rows);
    if let Some((row, field)) = rows
        .iter()
        .find_map(|row| row.non_finite_field().map(|field| (row.row_id, field)))
    {
        return Err(PlannerError::invalid_input(field)
            .with_reason(format!("row {row} must hold a finite number")));
    }
    let revision = current.map_or(1, |plan| plan.revision + 1);
    let now = Timestamp::now();
    let rows_json = serde_json::to_string(&rows)?;

    conn.execute(
        UPSERT_PLAN_SQL,
        params![date.to_string(), revision, now.to_string(), rows_json],
    )
    .db_context("Failed to store plan")?;

    Ok(Plan {
        date,
        plan_id: Plan::make_id(date, revision),
        revision,
        locked: false,
        generated_at: now,
        summary: PlanSummary::from_rows(&rows),
        rows,
    })
}

impl super::Database {
    /// Retrieves the current plan for a date.
    pub fn get_plan(&self, date: Date) -> Result<Option<Plan>> {
        select_plan(&self.connection, date)
    }

    /// Replaces the plan for a date, refusing locked plans.
    pub fn put_plan(&mut self, date: Date, rows: Vec<PlanRow>) -> Result<Plan> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let current = select_plan(&tx, date)?;
        let plan = write_next_revision(&tx, date, current.as_ref(), rows)?;

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(plan)
    }

    /// Marks the plan for a date as locked. Returns `None` when no plan
    /// exists.
    pub fn lock_plan(&mut self, date: Date) -> Result<Option<Plan>> {
        Ok(self.lock_plan_with(date, |_| Ok(()))?.map(|(plan, ())| plan))
    }

    /// Locks the plan for a date and runs `finish` on the locked plan
    /// before committing. The lock is rolled back if `finish` fails.
    pub fn lock_plan_with<T>(
        &mut self,
        date: Date,
        finish: impl FnOnce(&Plan) -> Result<T>,
    ) -> Result<Option<(Plan, T)>> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let updated = tx
            .execute(LOCK_PLAN_SQL, params![date.to_string()])
            .db_context("Failed to lock plan")?;
        if updated == 0 {
            return Ok(None);
        }
        let Some(plan) = select_plan(&tx, date)? else {
            return Ok(None);
        };
        let finished = finish(&plan)?;

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(Some((plan, finished)))
    }

    /// Applies a manual override to one row and records the audit entry in
    /// the same transaction. Either both are committed or neither is.
    pub fn edit_plan_row(
        &mut self,
        date: Date,
        row_id: u32,
        edit: &RowEdit,
        user: &str,
        reason: &str,
    ) -> Result<(Plan, AuditEntry)> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let current = select_plan(&tx, date)?.ok_or(PlannerError::PlanNotFound { date })?;
        if current.locked {
            return Err(PlannerError::PlanLocked { date });
        }

        let mut rows = current.rows.clone();
        let row = rows.iter_mut().find(|row| row.row_id == row_id).ok_or_else(|| {
            PlannerError::invalid_input("row_id")
                .with_reason(format!("plan for {date} has no row {row_id}"))
        })?;
        let before = row.clone();
        edit.apply(row);

        let change = serde_json::json!({
            "date": date,
            "row_id": row_id,
            "edit": edit,
            "before": {
                "cmo_stockyard_location_id": before.cmo_stockyard_location_id,
                "destinations": before.destinations,
                "quantity_tonnes": before.quantity_tonnes,
            },
        });
        let entry = insert_audit_entry(&tx, user, reason, &change, Timestamp::now())?;
        let plan = write_next_revision(&tx, date, Some(&current), rows)?;

        tx.commit().db_context("Failed to commit transaction")?;
        Ok((plan, entry))
    }
}
