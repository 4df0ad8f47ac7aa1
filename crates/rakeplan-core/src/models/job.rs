//! Optimization job model and the shapes reported to pollers.

use jiff::{civil::Date, Timestamp};
use serde::{Deserialize, Serialize};

use super::JobStatus;

/// Parameters forwarded to the external optimizer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptimizationRequest {
    /// Planning horizon in hours
    pub horizon_hours: u32,

    /// Whether the optimizer should consume the demand forecast
    pub use_forecast: bool,

    /// Quick mode trades plan quality for solver time
    pub quick: bool,

    /// Solver time budget
    pub time_limit_seconds: u32,

    /// Plan date the result is stored under
    pub date: Date,
}

/// A submitted optimization request and its progress.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptimizationJob {
    /// UUID issued on submit
    pub id: String,

    pub status: JobStatus,

    pub request: OptimizationRequest,

    pub submitted_at: Timestamp,

    /// Set when a worker picks the job up
    pub started_at: Option<Timestamp>,

    /// Set on reaching a terminal state
    pub completed_at: Option<Timestamp>,

    /// Date of the plan produced by a completed job
    pub result_ref: Option<Date>,

    /// Failure reason for failed jobs
    pub error: Option<String>,
}

impl OptimizationJob {
    /// Location of the generated plan, once there is one.
    pub fn result_url(&self) -> Option<String> {
        self.result_ref.map(|date| format!("/api/plans/{date}"))
    }

    pub fn progress(&self) -> u8 {
        self.status.progress()
    }
}

/// Response to a submit call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmittedJob {
    pub job_id: String,
    pub status: JobStatus,
    pub submitted_at: Timestamp,
    pub time_limit_seconds: u32,
}

impl From<&OptimizationJob> for SubmittedJob {
    fn from(job: &OptimizationJob) -> Self {
        Self {
            job_id: job.id.clone(),
            status: job.status,
            submitted_at: job.submitted_at,
            time_limit_seconds: job.request.time_limit_seconds,
        }
    }
}

/// Response to a poll call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobView {
    pub job_id: String,
    pub status: JobStatus,
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&OptimizationJob> for JobView {
    fn from(job: &OptimizationJob) -> Self {
        Self {
            job_id: job.id.clone(),
            status: job.status,
            progress: job.progress(),
            result_url: job.result_url(),
            completed_at: job.completed_at,
            error: job.error.clone(),
        }
    }
}
