//! Job registry operations for the Planner.

use std::time::Duration;

use jiff::{SignedDuration, Timestamp};
use uuid::Uuid;

use super::{today, Planner};
use crate::{
    error::{PlannerError, Result},
    models::{JobStatus, JobView, OptimizationJob, Plan, PlanRow},
    params::{JobId, SubmitOptimization},
};

/// Error recorded on a job cancelled by a client.
pub const CANCELLED: &str = "cancelled";
/// Error recorded on jobs that were in flight when the server stopped.
pub const INTERRUPTED: &str = "interrupted";

impl Planner {
    /// Persists a new job in the `Submitted` state.
    ///
    /// Queueing the job for execution is the dispatcher's concern; see
    /// [`JobDispatcher::submit`](crate::dispatch::JobDispatcher::submit).
    pub async fn submit_job(&self, params: SubmitOptimization) -> Result<OptimizationJob> {
        let request = params.into_request(today())?;
        let job = OptimizationJob {
            id: Uuid::new_v4().to_string(),
            status: JobStatus::Submitted,
            request,
            submitted_at: Timestamp::now(),
            started_at: None,
            completed_at: None,
            result_ref: None,
            error: None,
        };

        let stored = job.clone();
        self.with_db(move |db| db.insert_job(&stored)).await?;
        log::info!(
            "job {} submitted for {} (quick: {}, limit: {}s)",
            job.id,
            job.request.date,
            job.request.quick,
            job.request.time_limit_seconds
        );
        Ok(job)
    }

    /// Retrieves a live job by id.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::JobNotFound` for ids that were never issued and
    /// `PlannerError::StaleJob` for jobs that have expired.
    pub async fn get_job(&self, params: &JobId) -> Result<OptimizationJob> {
        let id = params.id.clone();
        let record = self.with_db(move |db| db.get_job(&id)).await?;

        match record {
            None => Err(PlannerError::JobNotFound {
                id: params.id.clone(),
            }),
            Some(record) if record.expired => Err(PlannerError::StaleJob {
                id: params.id.clone(),
            }),
            Some(record) => Ok(record.job),
        }
    }

    /// Reports a job's progress. Side-effect free.
    pub async fn poll_job(&self, params: &JobId) -> Result<JobView> {
        let job = self.get_job(params).await?;
        Ok(JobView::from(&job))
    }

    /// Fails a pending or running job with the error `"cancelled"`.
    ///
    /// Cancelling a job that already reached a terminal state returns it
    /// unchanged, so repeated cancels are harmless.
    pub async fn cancel_job(&self, params: &JobId) -> Result<JobView> {
        // Surface NotFound/StaleJob before touching anything
        self.get_job(params).await?;

        if self.fail_job(&params.id, CANCELLED).await? {
            log::info!("job {} cancelled", params.id);
        }
        self.poll_job(params).await
    }

    /// Submitted → Running. Returns false when the job was cancelled
    /// before a worker reached it.
    pub async fn start_job(&self, id: &str) -> Result<bool> {
        let id_owned = id.to_string();
        let started = self
            .with_db(move |db| db.mark_job_running(&id_owned, Timestamp::now()))
            .await?;
        if started {
            log::info!("job {id} running");
        }
        Ok(started)
    }

    /// Stores the optimizer's rows as the plan for the job's date and marks
    /// the job completed, both or neither.
    ///
    /// Returns `None` when the job stopped running in the meantime (for
    /// example it was cancelled); the rows are then discarded.
    pub async fn complete_job(
        &self,
        job: &OptimizationJob,
        rows: Vec<PlanRow>,
    ) -> Result<Option<Plan>> {
        let date = job.request.date;
        let _guard = self.lock_date(date).await;

        let id = job.id.clone();
        let plan = self
            .with_db(move |db| db.complete_job(&id, Timestamp::now(), date, rows))
            .await?;

        match &plan {
            Some(plan) => log::info!(
                "job {} completed: {} ({} rows, total cost {:.2})",
                job.id,
                plan.plan_id,
                plan.rows.len(),
                plan.summary.total_cost
            ),
            None => log::warn!("job {} no longer running, discarding its result", job.id),
        }
        Ok(plan)
    }

    /// Submitted/Running → Failed. Returns false when the job was already
    /// terminal.
    pub async fn fail_job(&self, id: &str, error: &str) -> Result<bool> {
        let id_owned = id.to_string();
        let error_owned = error.to_string();
        let failed = self
            .with_db(move |db| db.mark_job_failed(&id_owned, Timestamp::now(), &error_owned))
            .await?;
        if failed && error != CANCELLED {
            log::warn!("job {id} failed: {error}");
        }
        Ok(failed)
    }

    /// Expires terminal jobs that finished longer than `retention` ago.
    pub async fn purge_expired_jobs(&self, retention: Duration) -> Result<usize> {
        let retention = SignedDuration::try_from(retention).map_err(|e| {
            PlannerError::configuration(format!("invalid job retention: {e}"))
        })?;
        let cutoff = Timestamp::now() - retention;
        let expired = self
            .with_db(move |db| db.expire_jobs_before(cutoff))
            .await?;
        if expired > 0 {
            log::debug!("expired {expired} finished jobs");
        }
        Ok(expired)
    }

    /// Fails every job left `Submitted` or `Running` by a previous process.
    pub async fn fail_interrupted_jobs(&self) -> Result<usize> {
        let stranded = self
            .with_db(|db| db.list_jobs_with_status(&[JobStatus::Submitted, JobStatus::Running]))
            .await?;

        let mut failed = 0;
        for job in stranded {
            if self.fail_job(&job.id, INTERRUPTED).await? {
                failed += 1;
            }
        }
        Ok(failed)
    }
}
