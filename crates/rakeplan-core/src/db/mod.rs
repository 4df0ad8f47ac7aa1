//! Database operations and SQLite management for jobs, plans and the audit
//! log.
//!
//! This module provides low-level database operations for the planner. It
//! handles SQLite connections and schema management, and provides
//! specialized query interfaces per table.

use std::{path::Path, time::Duration};

use rusqlite::Connection;

use crate::error::{DatabaseResultExt, Result};

pub mod audit_queries;
pub mod job_queries;
pub mod migrations;
pub mod plan_queries;
pub mod utils;

pub use job_queries::JobRecord;

/// How long a connection waits on a competing writer before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Creates a new database connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;
        connection
            .busy_timeout(BUSY_TIMEOUT)
            .db_context("Failed to set busy timeout")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }
}
