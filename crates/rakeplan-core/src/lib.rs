//! Core library for the rakeplan dispatch planning service.
//!
//! This crate holds the business logic behind the planning API: a registry of
//! asynchronous optimization jobs, the per-date plan store, an append-only
//! audit log of manual overrides, what-if simulation and the client side of
//! the external optimizer service.
//!
//! # Layout
//!
//! - [`planner`]: the [`Planner`] facade every interface goes through
//! - [`dispatch`]: the worker pool that runs optimization jobs
//! - [`upstream`]: transport, envelopes and records of the optimizer service
//! - [`db`]: SQLite persistence for jobs, plans and the audit log
//! - [`models`] and [`params`]: domain types and operation inputs
//! - [`display`]: markdown formatting used by the CLI
//! - [`export`]: CSV and PDF artifacts written when a plan is locked
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rakeplan_core::{params::Simulate, PlannerBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let planner = PlannerBuilder::new()
//!     .with_database_path(Some("rakeplan.db"))
//!     .build()
//!     .await?;
//!
//! let what_if = planner
//!     .simulate(&Simulate {
//!         delay_min: 45.0,
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("{what_if}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod dispatch;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod params;
pub mod planner;
pub mod simulation;
pub mod upstream;

pub use config::ServerConfig;
pub use db::Database;
pub use dispatch::JobDispatcher;
pub use error::{PlannerError, Result};
pub use planner::{Planner, PlannerBuilder};
