//! Markdown formatting for domain models and operation results.
//!
//! Models implement [`std::fmt::Display`] directly. Collections and
//! operation outcomes that need extra framing get small wrapper types. The
//! CLI renders everything through termimad.
//!
//! - [`collections`]: collection wrappers ([`AuditEntries`])
//! - [`results`]: operation outcomes ([`EditResult`], lock and what-if results)
//! - [`status`]: one-line confirmations ([`OperationStatus`])
//! - [`datetime`]: timestamp helpers
//! - [`models`]: Display implementations for domain models
//!
//! ```rust
//! use rakeplan_core::display::OperationStatus;
//!
//! let status = OperationStatus::success("Job cancelled");
//! assert_eq!(status.to_string(), "Success: Job cancelled\n");
//! ```

pub mod collections;
pub mod datetime;
pub mod models;
pub mod results;
pub mod status;

pub use collections::AuditEntries;
pub use datetime::{Elapsed, LocalDateTime};
pub use results::EditResult;
pub use status::OperationStatus;
