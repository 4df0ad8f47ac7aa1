//! Status enumerations for optimization jobs and plan rows.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle of an optimization job.
///
/// Progression is monotonic: `Submitted → Running → {Completed | Failed}`.
/// A job may also fail straight from `Submitted` (cancelled before a worker
/// picked it up).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted and queued, no worker has picked it up yet
    Submitted,

    /// A worker is waiting on the external optimizer
    Running,

    /// Plan generated and stored
    Completed,

    /// Optimizer error, timeout or cancellation
    Failed,
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "submitted" => Ok(JobStatus::Submitted),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            _ => Err(format!("Invalid job status: {s}")),
        }
    }
}

impl JobStatus {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Submitted => "submitted",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Terminal states never change once reached.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Position in the lifecycle; a later observation never has a lower rank.
    pub fn rank(&self) -> u8 {
        match self {
            JobStatus::Submitted => 0,
            JobStatus::Running => 1,
            JobStatus::Completed | JobStatus::Failed => 2,
        }
    }

    /// Coarse progress percentage reported to pollers.
    pub fn progress(&self) -> u8 {
        match self {
            JobStatus::Submitted => 0,
            JobStatus::Running => 50,
            JobStatus::Completed | JobStatus::Failed => 100,
        }
    }
}

/// Status tag carried by every plan row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    /// Produced by the optimizer and accepted as-is
    #[default]
    Validated,

    /// Manually overridden, awaiting re-validation
    Pending,

    /// Expected to miss its slot
    Delayed,
}

impl FromStr for RowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "validated" => Ok(RowStatus::Validated),
            "pending" => Ok(RowStatus::Pending),
            "delayed" => Ok(RowStatus::Delayed),
            _ => Err(format!("Invalid row status: {s}")),
        }
    }
}

impl RowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowStatus::Validated => "validated",
            RowStatus::Pending => "pending",
            RowStatus::Delayed => "delayed",
        }
    }

    /// Get status with consistent icon formatting for display.
    pub fn with_icon(&self) -> &'static str {
        match self {
            RowStatus::Validated => "✓ Validated",
            RowStatus::Pending => "○ Pending",
            RowStatus::Delayed => "⚠ Delayed",
        }
    }
}
