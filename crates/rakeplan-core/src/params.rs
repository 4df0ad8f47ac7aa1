//! Parameter structures for planning operations.
//!
//! These structures are shared by every interface (HTTP handlers, CLI) and
//! carry no framework-specific derives beyond serde. Interface layers either
//! deserialize them directly or build them from their own argument types,
//! then hand them to the [`Planner`](crate::Planner).
//!
//! Validation and defaulting live next to the structures so every interface
//! enforces the same rules.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::{
    error::{PlannerError, Result},
    models::{OptimizationRequest, RowEdit},
    simulation::SimulationDelta,
};

/// Horizon used when a submit does not name one.
pub const DEFAULT_HORIZON_HOURS: u32 = 24;
/// Longest horizon the optimizer accepts.
pub const MAX_HORIZON_HOURS: u32 = 168;
/// Solver budget for quick runs.
pub const QUICK_TIME_LIMIT_SECONDS: u32 = 60;
/// Solver budget for full runs.
pub const FULL_TIME_LIMIT_SECONDS: u32 = 120;
/// Largest solver budget a caller may request.
pub const MAX_TIME_LIMIT_SECONDS: u32 = 3600;
/// Longest delay a simulation may hypothesize (one week).
pub const MAX_SIMULATED_DELAY_MINUTES: f64 = 7.0 * 24.0 * 60.0;
/// Largest per-row load change a simulation may apply, either way.
pub const MAX_SIMULATED_LOAD_DELTA: f64 = 100_000.0;
/// User recorded on audit entries that do not name one.
pub const DEFAULT_AUDIT_USER: &str = "planner";

/// Generic parameters for operations requiring just a job ID.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobId {
    pub id: String,
}

/// Parameters for submitting an optimization run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitOptimization {
    #[serde(default)]
    pub horizon_hours: Option<u32>,
    #[serde(default)]
    pub use_forecast: Option<bool>,
    /// Usually supplied as the `quick` query parameter
    #[serde(default)]
    pub quick: bool,
    #[serde(default)]
    pub time_limit_seconds: Option<u32>,
    /// Plan date to generate, defaults to today
    #[serde(default)]
    pub date: Option<Date>,
}

impl SubmitOptimization {
    /// Apply defaults and validate ranges.
    pub fn into_request(self, today: Date) -> Result<OptimizationRequest> {
        let horizon_hours = self.horizon_hours.unwrap_or(DEFAULT_HORIZON_HOURS);
        if !(1..=MAX_HORIZON_HOURS).contains(&horizon_hours) {
            return Err(PlannerError::invalid_input("horizon_hours").with_reason(format!(
                "must be between 1 and {MAX_HORIZON_HOURS}, got {horizon_hours}"
            )));
        }

        let default_limit = if self.quick {
            QUICK_TIME_LIMIT_SECONDS
        } else {
            FULL_TIME_LIMIT_SECONDS
        };
        let time_limit_seconds = self.time_limit_seconds.unwrap_or(default_limit);
        if !(1..=MAX_TIME_LIMIT_SECONDS).contains(&time_limit_seconds) {
            return Err(PlannerError::invalid_input("time_limit_seconds").with_reason(format!(
                "must be between 1 and {MAX_TIME_LIMIT_SECONDS}, got {time_limit_seconds}"
            )));
        }

        Ok(OptimizationRequest {
            horizon_hours,
            use_forecast: self.use_forecast.unwrap_or(true),
            quick: self.quick,
            time_limit_seconds,
            date: self.date.unwrap_or(today),
        })
    }
}

/// Parameters for appending to the audit log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppendAudit {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub change: serde_json::Value,
}

impl AppendAudit {
    /// Returns the user and trimmed reason, rejecting a blank reason.
    pub fn validate(&self) -> Result<(String, String)> {
        audit_identity(self.user.as_deref(), &self.reason)
    }
}

fn audit_identity(user: Option<&str>, reason: &str) -> Result<(String, String)> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(
            PlannerError::invalid_input("reason").with_reason("an override reason is required")
        );
    }
    let user = user
        .map(str::trim)
        .filter(|user| !user.is_empty())
        .unwrap_or(DEFAULT_AUDIT_USER);
    Ok((user.to_string(), reason.to_string()))
}

/// Parameters for a what-if simulation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Simulate {
    /// Hypothesized delay in minutes
    #[serde(default, rename = "delayMin")]
    pub delay_min: f64,
    /// Tonnes added to (or removed from) each affected row
    #[serde(default, rename = "loadDelta")]
    pub load_delta: f64,
    /// Plan date to simulate against, defaults to today
    #[serde(default)]
    pub date: Option<Date>,
    /// Restrict the delta to these rows; all rows when absent
    #[serde(default)]
    pub rows: Option<Vec<u32>>,
    /// Store the simulated plan as the current plan
    #[serde(default)]
    pub commit: bool,
}

impl Simulate {
    pub fn delta(&self) -> Result<SimulationDelta> {
        check_bounded("delayMin", self.delay_min, MAX_SIMULATED_DELAY_MINUTES)?;
        check_bounded("loadDelta", self.load_delta, MAX_SIMULATED_LOAD_DELTA)?;
        Ok(SimulationDelta {
            delay_minutes: self.delay_min,
            load_delta: self.load_delta,
            rows: self.rows.clone(),
        })
    }
}

fn check_bounded(field: &str, value: f64, max: f64) -> Result<()> {
    if !value.is_finite() || value.abs() > max {
        return Err(PlannerError::invalid_input(field)
            .with_reason(format!("must be a number between -{max} and {max}")));
    }
    Ok(())
}

/// Parameters for a manual row override.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditRow {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub edit: RowEdit,
    /// Submit a quick optimization after the edit is committed
    #[serde(default)]
    pub reoptimize: bool,
}

impl EditRow {
    /// Returns the user and trimmed reason after checking the edit itself.
    pub fn validate(&self) -> Result<(String, String)> {
        if self.edit.is_empty() {
            return Err(PlannerError::invalid_input("edit")
                .with_reason("at least one of cmo_stockyard_location_id, destinations or quantity_tonnes is required"));
        }
        if let Some(quantity) = self.edit.quantity_tonnes {
            if !quantity.is_finite() || quantity < 0.0 {
                return Err(PlannerError::invalid_input("quantity_tonnes")
                    .with_reason(format!("must be a non-negative number, got {quantity}")));
            }
        }
        if let Some(source) = &self.edit.cmo_stockyard_location_id {
            if source.trim().is_empty() {
                return Err(PlannerError::invalid_input("cmo_stockyard_location_id")
                    .with_reason("must not be empty"));
            }
        }
        audit_identity(self.user.as_deref(), &self.reason)
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    #[test]
    fn test_submit_defaults_for_quick_run() {
        let today = date(2025, 10, 5);
        let request = SubmitOptimization {
            quick: true,
            ..Default::default()
        }
        .into_request(today)
        .unwrap();

        assert_eq!(request.horizon_hours, 24);
        assert!(request.use_forecast);
        assert_eq!(request.time_limit_seconds, 60);
        assert_eq!(request.date, today);
    }

    #[test]
    fn test_submit_defaults_for_full_run() {
        let request = SubmitOptimization::default()
            .into_request(date(2025, 10, 5))
            .unwrap();
        assert_eq!(request.time_limit_seconds, 120);
        assert!(!request.quick);
    }

    #[test]
    fn test_submit_rejects_out_of_range_horizon() {
        let err = SubmitOptimization {
            horizon_hours: Some(0),
            ..Default::default()
        }
        .into_request(date(2025, 10, 5))
        .unwrap_err();
        assert!(matches!(err, PlannerError::InvalidInput { ref field, .. } if field == "horizon_hours"));
    }

    #[test]
    fn test_submit_rejects_excessive_time_limit() {
        let err = SubmitOptimization {
            time_limit_seconds: Some(MAX_TIME_LIMIT_SECONDS + 1),
            ..Default::default()
        }
        .into_request(date(2025, 10, 5))
        .unwrap_err();
        assert!(matches!(err, PlannerError::InvalidInput { .. }));
    }

    #[test]
    fn test_audit_requires_reason() {
        let params = AppendAudit {
            user: Some("asha".to_string()),
            reason: "   ".to_string(),
            change: serde_json::json!({}),
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_audit_defaults_user() {
        let params = AppendAudit {
            user: None,
            reason: " wagon shortage ".to_string(),
            change: serde_json::Value::Null,
        };
        let (user, reason) = params.validate().unwrap();
        assert_eq!(user, "planner");
        assert_eq!(reason, "wagon shortage");
    }

    #[test]
    fn test_edit_requires_reason_and_a_change() {
        let mut params = EditRow {
            reason: "rake swap".to_string(),
            ..Default::default()
        };
        assert!(params.validate().is_err());

        params.edit.quantity_tonnes = Some(-5.0);
        assert!(params.validate().is_err());

        params.edit.quantity_tonnes = Some(900.0);
        let (user, reason) = params.validate().unwrap();
        assert_eq!(user, DEFAULT_AUDIT_USER);
        assert_eq!(reason, "rake swap");

        params.reason = String::new();
        let err = params.validate().unwrap_err();
        assert!(matches!(err, PlannerError::InvalidInput { ref field, .. } if field == "reason"));
    }

    #[test]
    fn test_simulate_uses_dashboard_field_names() {
        let params: Simulate =
            serde_json::from_str(r#"{"delayMin": 25, "loadDelta": -10}"#).unwrap();
        let delta = params.delta().unwrap();
        assert_eq!(delta.delay_minutes, 25.0);
        assert_eq!(delta.load_delta, -10.0);
        assert!(delta.rows.is_none());
        assert!(!params.commit);
    }
}
