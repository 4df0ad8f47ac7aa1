//! Plan summary and KPI types.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::{Plan, PlanRow, RowStatus};

/// Aggregate figures for a plan, always derived from its rows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct PlanSummary {
    /// Sum of every row's total cost
    pub total_cost: f64,
    /// Mean row utilization, 0 for an empty plan
    pub avg_utilization: f64,
}

impl PlanSummary {
    /// Recompute the summary from a set of rows.
    pub fn from_rows(rows: &[PlanRow]) -> Self {
        let total_cost = rows.iter().map(|row| row.total_cost).sum();
        let avg_utilization = if rows.is_empty() {
            0.0
        } else {
            rows.iter().map(|row| row.utilization).sum::<f64>() / rows.len() as f64
        };
        Self {
            total_cost,
            avg_utilization,
        }
    }
}

/// Headline dispatch indicators for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Kpis {
    pub date: Date,
    pub total_cost: f64,
    pub avg_utilization: f64,
    /// Rakes dispatched by the plan
    pub active_rakes: u32,
    pub delayed_rakes: u32,
    /// Share of rakes not flagged delayed, as a percentage
    pub on_time_pct: f64,
}

impl From<&Plan> for Kpis {
    fn from(plan: &Plan) -> Self {
        let active_rakes = plan.rows.len() as u32;
        let delayed_rakes = plan
            .rows
            .iter()
            .filter(|row| row.status == RowStatus::Delayed)
            .count() as u32;
        let on_time_pct = if active_rakes == 0 {
            100.0
        } else {
            f64::from(active_rakes - delayed_rakes) * 100.0 / f64::from(active_rakes)
        };

        Self {
            date: plan.date,
            total_cost: plan.summary.total_cost,
            avg_utilization: plan.summary.avg_utilization,
            active_rakes,
            delayed_rakes,
            on_time_pct,
        }
    }
}
