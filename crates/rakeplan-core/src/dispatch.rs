//! Worker pool that runs optimization jobs.
//!
//! Submitted jobs are persisted first and then queued on an unbounded
//! channel shared by a fixed number of worker tasks. A worker moves the job to `Running`, calls the
//! [`Optimizer`] under the job's time limit (plus [`JOB_GRACE`]) and then
//! either publishes the plan and completes the job or fails it. Every
//! transition is compare-and-set, so a job cancelled while it runs stays
//! failed and its late result is dropped.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, Mutex},
    task::JoinHandle,
    time,
};

use crate::{
    config::JOB_GRACE,
    error::{PlannerError, Result},
    models::OptimizationJob,
    params::SubmitOptimization,
    upstream::Optimizer,
    Planner,
};

/// Handle for queueing jobs onto the worker pool.
#[derive(Clone)]
pub struct JobDispatcher {
    planner: Planner,
    queue: mpsc::UnboundedSender<OptimizationJob>,
}

impl JobDispatcher {
    /// Starts `workers` worker tasks on the current runtime.
    ///
    /// The workers stop once every dispatcher handle has been dropped and
    /// the queue has drained.
    pub fn start(
        planner: Planner,
        optimizer: Arc<dyn Optimizer>,
        workers: usize,
    ) -> (Self, Vec<JoinHandle<()>>) {
        let (queue, receiver) = mpsc::unbounded_channel();
        let receiver = Arc::new(Mutex::new(receiver));

        let handles = (0..workers.max(1))
            .map(|worker| {
                tokio::spawn(run_worker(
                    worker,
                    planner.clone(),
                    Arc::clone(&optimizer),
                    Arc::clone(&receiver),
                ))
            })
            .collect();

        (Self { planner, queue }, handles)
    }

    /// Persists a job and queues it. Returns as soon as the job is stored
    /// and queued; the optimization itself runs in the background.
    ///
    /// Storing and queueing run on their own task, so a caller that goes
    /// away mid-submit cannot leave a stored job that was never queued.
    pub async fn submit(&self, params: SubmitOptimization) -> Result<OptimizationJob> {
        let dispatcher = self.clone();
        tokio::spawn(async move { dispatcher.store_and_enqueue(params).await })
            .await
            .map_err(PlannerError::join)?
    }

    async fn store_and_enqueue(&self, params: SubmitOptimization) -> Result<OptimizationJob> {
        let job = self.planner.submit_job(params).await?;

        if self.queue.send(job.clone()).is_err() {
            self.planner.fail_job(&job.id, "worker pool stopped").await?;
            return Err(PlannerError::configuration(
                "optimization workers are not running",
            ));
        }
        Ok(job)
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }
}

async fn run_worker(
    worker: usize,
    planner: Planner,
    optimizer: Arc<dyn Optimizer>,
    receiver: Arc<Mutex<mpsc::UnboundedReceiver<OptimizationJob>>>,
) {
    log::debug!("worker {worker} started");
    loop {
        // Hold the receiver only while waiting, not while running a job
        let next = receiver.lock().await.recv().await;
        let Some(job) = next else { break };

        if let Err(e) = run_job(&planner, optimizer.as_ref(), &job, JOB_GRACE).await {
            log::error!("worker {worker} could not record outcome of job {}: {e}", job.id);
        }
    }
    log::debug!("worker {worker} stopped");
}

/// Runs one job to a terminal state, allowing `grace` on top of its time
/// limit.
async fn run_job(
    planner: &Planner,
    optimizer: &dyn Optimizer,
    job: &OptimizationJob,
    grace: Duration,
) -> Result<()> {
    if !planner.start_job(&job.id).await? {
        log::info!("job {} was cancelled before it started", job.id);
        return Ok(());
    }

    let limit = Duration::from_secs(u64::from(job.request.time_limit_seconds)) + grace;
    match time::timeout(limit, optimizer.optimize(&job.request)).await {
        Ok(Ok(rows)) => match planner.complete_job(job, rows).await {
            Ok(_) => {}
            Err(e @ PlannerError::PlanLocked { .. }) => {
                planner.fail_job(&job.id, &e.to_string()).await?;
            }
            Err(e) => {
                planner.fail_job(&job.id, &e.to_string()).await?;
                return Err(e);
            }
        },
        Ok(Err(e)) => {
            planner.fail_job(&job.id, &e.to_string()).await?;
        }
        Err(_) => {
            let message = format!(
                "optimization exceeded its time limit of {}s",
                job.request.time_limit_seconds
            );
            planner.fail_job(&job.id, &message).await?;
        }
    }
    Ok(())
}
