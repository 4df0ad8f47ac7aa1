//! Job registry queries.
//!
//! Status changes are compare-and-set: each transition names the states it
//! may leave from and only updates a row still in one of them, so a status
//! never moves backwards no matter how workers and cancellations interleave.

use jiff::{civil::Date, Timestamp};
use rusqlite::{params, OptionalExtension, Row};

use super::{
    plan_queries::{select_plan, write_next_revision},
    utils::{parse_date, parse_enum, parse_optional_timestamp, parse_timestamp},
};
use crate::{
    error::{DatabaseResultExt, Result},
    models::{JobStatus, OptimizationJob, OptimizationRequest, Plan, PlanRow},
};

const SELECT_JOB_COLUMNS: &str = "SELECT id, status, horizon_hours, use_forecast, quick, \
     time_limit_seconds, plan_date, submitted_at, started_at, completed_at, result_ref, error, \
     expired FROM jobs";

const INSERT_JOB_SQL: &str = "INSERT INTO jobs (id, status, horizon_hours, use_forecast, quick, \
     time_limit_seconds, plan_date, submitted_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

const MARK_RUNNING_SQL: &str =
    "UPDATE jobs SET status = 'running', started_at = ?1 WHERE id = ?2 AND status = 'submitted'";

const MARK_COMPLETED_SQL: &str = "UPDATE jobs SET status = 'completed', completed_at = ?1, \
     result_ref = ?2 WHERE id = ?3 AND status = 'running'";

const MARK_FAILED_SQL: &str = "UPDATE jobs SET status = 'failed', completed_at = ?1, error = ?2 \
     WHERE id = ?3 AND status IN ('submitted', 'running')";

/// A stored job plus registry bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    pub job: OptimizationJob,
    /// Expired jobs are kept as tombstones so pollers can tell them apart
    /// from ids that were never issued
    pub expired: bool,
}

impl super::Database {
    fn build_job_from_row(row: &Row<'_>) -> rusqlite::Result<JobRecord> {
        let status: String = row.get(1)?;
        let plan_date: String = row.get(6)?;
        let submitted_at: String = row.get(7)?;
        let result_ref: Option<String> = row.get(10)?;

        Ok(JobRecord {
            job: OptimizationJob {
                id: row.get(0)?,
                status: parse_enum(1, &status)?,
                request: OptimizationRequest {
                    horizon_hours: row.get(2)?,
                    use_forecast: row.get(3)?,
                    quick: row.get(4)?,
                    time_limit_seconds: row.get(5)?,
                    date: parse_date(6, &plan_date)?,
                },
                submitted_at: parse_timestamp(7, &submitted_at)?,
                started_at: parse_optional_timestamp(8, row.get(8)?)?,
                completed_at: parse_optional_timestamp(9, row.get(9)?)?,
                result_ref: result_ref.map(|d| parse_date(10, &d)).transpose()?,
                error: row.get(11)?,
            },
            expired: row.get(12)?,
        })
    }

    /// Persists a freshly submitted job.
    pub fn insert_job(&self, job: &OptimizationJob) -> Result<()> {
        let request = &job.request;
        self.connection
            .execute(
                INSERT_JOB_SQL,
                params![
                    job.id,
                    job.status.as_str(),
                    request.horizon_hours,
                    request.use_forecast,
                    request.quick,
                    request.time_limit_seconds,
                    request.date.to_string(),
                    job.submitted_at.to_string(),
                ],
            )
            .db_context("Failed to insert job")?;
        Ok(())
    }

    /// Retrieves a job by id, including expired tombstones.
    pub fn get_job(&self, id: &str) -> Result<Option<JobRecord>> {
        self.connection
            .query_row(
                &format!("{SELECT_JOB_COLUMNS} WHERE id = ?1"),
                params![id],
                Self::build_job_from_row,
            )
            .optional()
            .db_context("Failed to query job")
    }

    /// Lists live jobs in any of the given states, oldest first.
    pub fn list_jobs_with_status(&self, statuses: &[JobStatus]) -> Result<Vec<OptimizationJob>> {
        let mut stmt = self
            .connection
            .prepare(&format!(
                "{SELECT_JOB_COLUMNS} WHERE expired = 0 ORDER BY submitted_at ASC"
            ))
            .db_context("Failed to prepare job listing")?;

        let records = stmt
            .query_map([], Self::build_job_from_row)
            .db_context("Failed to list jobs")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to read jobs")?;

        Ok(records
            .into_iter()
            .map(|record| record.job)
            .filter(|job| statuses.contains(&job.status))
            .collect())
    }

    /// Submitted → Running. Returns false if the job already moved on.
    pub fn mark_job_running(&self, id: &str, now: Timestamp) -> Result<bool> {
        let updated = self
            .connection
            .execute(MARK_RUNNING_SQL, params![now.to_string(), id])
            .db_context("Failed to mark job running")?;
        Ok(updated == 1)
    }

    /// Running → Completed, storing `rows` as the next revision of the plan
    /// for `date` in the same transaction.
    ///
    /// Returns `None` and stores nothing if the job is no longer running.
    /// A locked plan fails with `PlanLocked` and leaves the job running for
    /// the caller to fail.
    pub fn complete_job(
        &mut self,
        id: &str,
        now: Timestamp,
        date: Date,
        rows: Vec<PlanRow>,
    ) -> Result<Option<Plan>> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let updated = tx
            .execute(
                MARK_COMPLETED_SQL,
                params![now.to_string(), date.to_string(), id],
            )
            .db_context("Failed to mark job completed")?;
        if updated == 0 {
            return Ok(None);
        }

        let current = select_plan(&tx, date)?;
        let plan = write_next_revision(&tx, date, current.as_ref(), rows)?;

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(Some(plan))
    }

    /// Submitted/Running → Failed. Returns false if the job was already
    /// terminal.
    pub fn mark_job_failed(&self, id: &str, now: Timestamp, error: &str) -> Result<bool> {
        let updated = self
            .connection
            .execute(MARK_FAILED_SQL, params![now.to_string(), error, id])
            .db_context("Failed to mark job failed")?;
        Ok(updated == 1)
    }

    /// Marks terminal jobs that finished before `cutoff` as expired.
    pub fn expire_jobs_before(&mut self, cutoff: Timestamp) -> Result<usize> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let candidates: Vec<(String, String)> = {
            let mut stmt = tx
                .prepare(
                    "SELECT id, completed_at FROM jobs \
                     WHERE expired = 0 AND completed_at IS NOT NULL",
                )
                .db_context("Failed to prepare expiry scan")?;
            let rows = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
                .db_context("Failed to scan jobs for expiry")?
                .collect::<std::result::Result<Vec<_>, _>>()
                .db_context("Failed to read jobs for expiry")?;
            rows
        };

        let mut expired = 0;
        for (id, completed_at) in candidates {
            let completed_at =
                parse_timestamp(1, &completed_at).db_context("Invalid job completion time")?;
            if completed_at < cutoff {
                expired += tx
                    .execute("UPDATE jobs SET expired = 1 WHERE id = ?1", params![id])
                    .db_context("Failed to expire job")?;
            }
        }

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(expired)
    }
}
