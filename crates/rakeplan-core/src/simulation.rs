//! What-if simulation over a plan snapshot.
//!
//! A simulation applies a hypothesized delay and load change to a plan and
//! reports the resulting plan together with its deltas. It is a pure
//! function of its inputs: the same snapshot and delta always produce the
//! same result, and the stored plan is never touched. Committing a result
//! is the caller's decision (see [`Planner::simulate`](crate::Planner::simulate)).

use serde::{Deserialize, Serialize};

use crate::models::{Plan, PlanSummary, RowStatus};

/// Cost added to an affected row per minute of delay.
pub const PENALTY_PER_MINUTE: f64 = 10.0;

/// Delays strictly longer than this flip affected rows to delayed.
pub const DELAY_THRESHOLD_MINUTES: f64 = 20.0;

/// Hypothesized change to apply to a plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationDelta {
    /// Negative delays are treated as zero for costing
    pub delay_minutes: f64,
    pub load_delta: f64,
    /// Affected row ids, all rows when `None`
    pub rows: Option<Vec<u32>>,
}

impl SimulationDelta {
    fn affects(&self, row_id: u32) -> bool {
        self.rows.as_ref().map_or(true, |ids| ids.contains(&row_id))
    }

    /// Penalty added to each affected row.
    pub fn penalty(&self) -> f64 {
        self.delay_minutes.max(0.0) * PENALTY_PER_MINUTE
    }
}

/// Differences between the simulated plan and its input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationDeltas {
    pub cost_delta: f64,
    pub load_delta: f64,
    /// Rows that became delayed because of this simulation
    pub delayed_rows: u32,
}

/// A simulated plan and how it differs from the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedPlan {
    #[serde(flatten)]
    pub plan: Plan,
    pub deltas: SimulationDeltas,
}

/// Apply `delta` to a copy of `plan`.
pub fn simulate(plan: &Plan, delta: &SimulationDelta) -> SimulatedPlan {
    let penalty = delta.penalty();
    let delays = delta.delay_minutes > DELAY_THRESHOLD_MINUTES;

    let mut simulated = plan.clone();
    let mut deltas = SimulationDeltas::default();

    for row in simulated.rows.iter_mut().filter(|row| delta.affects(row.row_id)) {
        row.total_cost += penalty;
        deltas.cost_delta += penalty;

        let quantity = (row.quantity_tonnes + delta.load_delta).max(0.0);
        deltas.load_delta += quantity - row.quantity_tonnes;
        row.quantity_tonnes = quantity;

        if delays && row.status != RowStatus::Delayed {
            row.status = RowStatus::Delayed;
            deltas.delayed_rows += 1;
        }
    }

    simulated.summary = PlanSummary::from_rows(&simulated.rows);

    SimulatedPlan {
        plan: simulated,
        deltas,
    }
}
