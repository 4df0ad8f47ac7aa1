//! Error types for the planning library.

use std::path::PathBuf;

use jiff::civil::Date;
use thiserror::Error;

/// Error returned by every planner, store and upstream operation.
///
/// The HTTP layer maps variants onto status codes; see
/// [`PlannerError::is_client_error`].
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// No plan has been stored for the given date
    #[error("No plan found for {date}")]
    PlanNotFound { date: Date },
    /// Job id was never issued
    #[error("Job {id} not found")]
    JobNotFound { id: String },
    /// Job id was issued but its record has expired
    #[error("Job {id} has expired and is no longer tracked")]
    StaleJob { id: String },
    /// The plan for the date is locked against further writes
    #[error("Plan for {date} is locked")]
    PlanLocked { date: Date },
    /// No export artifact exists; plans are exported when locked
    #[error("No {format} export for {date}")]
    ExportNotFound { date: Date, format: String },
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// External optimizer service failed or returned something unusable
    #[error("{message}")]
    Upstream {
        message: String,
        details: Option<String>,
    },
    /// Creating the data or exports directory, or writing an export
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Stored rows or change payloads that do not round-trip
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Bad settings, or an internal task that could not complete
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> PlannerError {
        PlannerError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl PlannerError {
    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Creates an upstream error with optional diagnostic details.
    pub fn upstream(message: impl Into<String>, details: Option<String>) -> Self {
        Self::Upstream {
            message: message.into(),
            details,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Wraps a `spawn_blocking` join failure.
    pub(crate) fn join(e: tokio::task::JoinError) -> Self {
        Self::configuration(format!("Task join error: {e}"))
    }

    /// Whether the caller, not the server, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::PlanNotFound { .. }
                | Self::JobNotFound { .. }
                | Self::StaleJob { .. }
                | Self::PlanLocked { .. }
                | Self::ExportNotFound { .. }
                | Self::InvalidInput { .. }
        )
    }
}

/// Attaches a message to rusqlite failures.
pub trait DatabaseResultExt<T> {
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|source| PlannerError::Database {
            message: message.to_string(),
            source,
        })
    }
}

/// Result type alias for planning operations
pub type Result<T> = std::result::Result<T, PlannerError>;
