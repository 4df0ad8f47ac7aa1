//! High-level planner API over the job registry, plan store and audit log.
//!
//! The [`Planner`] is the central coordinator between the interface layers
//! (HTTP handlers, CLI, the dispatch workers) and the database. Every
//! operation opens its own connection on the blocking thread pool, so a
//! `Planner` is cheap to clone and share between tasks.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  HTTP / CLI /   │    │   Operations    │    │    Database     │
//! │    workers      │───▶│ (job_ops,       │───▶│   (via db/)     │
//! │                 │    │  plan_ops, ...) │    │                 │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: Factory for creating [`Planner`] instances with configuration
//! - [`job_ops`]: Submit, poll, cancel and the worker-side job transitions
//! - [`plan_ops`]: Plan reads and writes, lock/export, manual edits, what-if
//! - [`audit_ops`]: The append-only audit log
//!
//! Plan writers for the same date (job completion, simulation commits,
//! manual edits, locks) are serialized by a per-date async lock. Readers
//! never take it; SQLite transactions ensure they only see committed plans.
//!
//! # Usage
//!
//! ```rust,no_run
//! use rakeplan_core::{params::SubmitOptimization, PlannerBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let planner = PlannerBuilder::new()
//!     .with_database_path(Some("/tmp/rakeplan.db"))
//!     .build()
//!     .await?;
//!
//! let job = planner
//!     .submit_job(SubmitOptimization {
//!         quick: true,
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("submitted {}", job.id);
//! # Ok(())
//! # }
//! ```

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex as SyncMutex, PoisonError},
};

use jiff::{civil::Date, tz::TimeZone, Timestamp};
use tokio::{
    sync::{Mutex, OwnedMutexGuard},
    task,
};

use crate::{
    db::Database,
    error::{PlannerError, Result},
};

pub mod audit_ops;
pub mod builder;
pub mod job_ops;
pub mod plan_ops;

#[cfg(test)]
mod tests;

pub use builder::PlannerBuilder;

/// Per-date writer locks. An entry lives only while some writer holds or
/// waits for it.
#[derive(Debug, Clone, Default)]
struct DateLocks(Arc<SyncMutex<HashMap<Date, Arc<Mutex<()>>>>>);

impl DateLocks {
    async fn acquire(&self, date: Date) -> DateGuard {
        let lock = {
            let mut locks = self.0.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(date).or_default())
        };
        DateGuard {
            date,
            locks: self.clone(),
            guard: Some(lock.lock_owned().await),
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Holds the writer lock for one date; forgets the date when the last
/// writer is done with it.
struct DateGuard {
    date: Date,
    locks: DateLocks,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for DateGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut locks = self.locks.0.lock().unwrap_or_else(PoisonError::into_inner);
        if locks
            .get(&self.date)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.date);
        }
    }
}

/// Main planner interface for managing jobs, plans and the audit log.
#[derive(Debug, Clone)]
pub struct Planner {
    pub(crate) db_path: PathBuf,
    pub(crate) exports_dir: PathBuf,
    date_locks: DateLocks,
}

impl Planner {
    /// Creates a new planner with the specified database path.
    pub(crate) fn new(db_path: PathBuf, exports_dir: PathBuf) -> Self {
        Self {
            db_path,
            exports_dir,
            date_locks: DateLocks::default(),
        }
    }

    /// Directory that receives lock exports.
    pub fn exports_dir(&self) -> &Path {
        &self.exports_dir
    }

    /// Runs `op` against a fresh connection on the blocking pool.
    async fn with_db<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Database) -> Result<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            op(&mut db)
        })
        .await
        .map_err(PlannerError::join)?
    }

    /// Serializes plan writers for `date` until the guard is dropped.
    async fn lock_date(&self, date: Date) -> DateGuard {
        self.date_locks.acquire(date).await
    }
}

/// Today's date in UTC, the default plan date.
pub fn today() -> Date {
    Timestamp::now().to_zoned(TimeZone::UTC).date()
}
