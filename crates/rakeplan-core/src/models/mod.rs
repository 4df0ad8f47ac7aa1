//! Data models for jobs, plans and the audit trail.
//!
//! This module contains the core domain models of the rake dispatch planner.
//! Display implementations for these models are located in
//! [`crate::display::models`] to keep data structures apart from
//! presentation logic.
//!
//! # Model Overview
//!
//! - [`OptimizationJob`]: a submitted optimization request moving through
//!   [`JobStatus`] states
//! - [`Plan`] / [`PlanRow`]: the dispatch assignments stored per date, with a
//!   [`PlanSummary`] that is always derived from the rows
//! - [`AuditEntry`]: an append-only record of a manual override
//! - [`LockOutcome`]: what locking a plan exported
//!
//! # Examples
//!
//! ```rust
//! use rakeplan_core::models::{PlanRow, PlanSummary, RowStatus};
//!
//! let row = PlanRow {
//!     row_id: 0,
//!     cmo_stockyard_location_id: "SY-BOK".to_string(),
//!     product_id: "HR-COIL".to_string(),
//!     customer_id: "CUST-KOL".to_string(),
//!     destinations: vec!["Kolkata".to_string()],
//!     quantity_tonnes: 990.0,
//!     wagons_used: 58,
//!     distance_km: 310.0,
//!     transport_cost: 41_000.0,
//!     loading_cost: 12_200.0,
//!     total_cost: 53_200.0,
//!     utilization: 0.9,
//!     status: RowStatus::Validated,
//! };
//!
//! let summary = PlanSummary::from_rows(&[row]);
//! assert_eq!(summary.total_cost, 53_200.0);
//! ```

pub mod audit;
pub mod export;
pub mod job;
pub mod plan;
pub mod requests;
pub mod status;
pub mod summary;


pub use audit::AuditEntry;
pub use export::{ExportFormat, Exported, LockOutcome};
pub use job::{JobView, OptimizationJob, OptimizationRequest, SubmittedJob};
pub use plan::{Plan, PlanRow};
pub use requests::RowEdit;
pub use status::{JobStatus, RowStatus};
pub use summary::{Kpis, PlanSummary};
