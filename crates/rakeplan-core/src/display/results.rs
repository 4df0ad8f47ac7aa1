//! Result wrapper types for displaying operation outcomes.

use std::fmt;

use crate::{
    models::{AuditEntry, LockOutcome, Plan},
    simulation::SimulatedPlan,
};

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

impl fmt::Display for LockOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} for {}", self.message, self.date)?;
        writeln!(f)?;
        writeln!(f, "- CSV exported: {}", yes_no(self.exported.csv))?;
        writeln!(f, "- PDF exported: {}", yes_no(self.exported.pdf))
    }
}

/// Wrapper for the outcome of a manual row edit.
///
/// Shows the audit entry that was recorded followed by the plan as it now
/// stands.
pub struct EditResult {
    pub plan: Plan,
    pub entry: AuditEntry,
}

impl EditResult {
    pub fn new(plan: Plan, entry: AuditEntry) -> Self {
        Self { plan, entry }
    }
}

impl fmt::Display for EditResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Updated plan {} (audit entry #{})",
            self.plan.plan_id, self.entry.id
        )?;
        writeln!(f)?;
        write!(f, "{}", self.plan)
    }
}

impl fmt::Display for SimulatedPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## What-if deltas")?;
        writeln!(f)?;
        writeln!(f, "- Cost: {:+.2}", self.deltas.cost_delta)?;
        writeln!(f, "- Load: {:+.2} t", self.deltas.load_delta)?;
        writeln!(f, "- Delayed rows: {}", self.deltas.delayed_rows)?;
        writeln!(f)?;
        write!(f, "{}", self.plan)
    }
}

#[cfg(test)]
mod tests {
    use jiff::{civil::date, Timestamp};

    use super::*;
    use crate::models::{Exported, PlanSummary};

    #[test]
    fn test_lock_outcome_lists_exports() {
        let outcome = LockOutcome {
            ok: true,
            date: date(2025, 10, 5),
            message: "Plan locked".to_string(),
            exported: Exported {
                csv: true,
                pdf: false,
            },
        };
        let output = outcome.to_string();
        assert!(output.starts_with("Plan locked for 2025-10-05"));
        assert!(output.contains("- CSV exported: yes"));
        assert!(output.contains("- PDF exported: no"));
    }

    #[test]
    fn test_edit_result_leads_with_audit_entry() {
        let plan = Plan {
            date: date(2025, 10, 5),
            plan_id: Plan::make_id(date(2025, 10, 5), 3),
            revision: 3,
            locked: false,
            generated_at: Timestamp::now(),
            rows: Vec::new(),
            summary: PlanSummary::default(),
        };
        let entry = AuditEntry {
            id: 7,
            user: "anonymous".to_string(),
            timestamp: Timestamp::now(),
            reason: "siding closed".to_string(),
            change: serde_json::Value::Null,
        };

        let output = EditResult::new(plan, entry).to_string();
        assert!(output.starts_with("Updated plan 2025-10-05-r3 (audit entry #7)\n\n# Plan"));
        assert!(output.contains("No rakes in this plan."));
    }
}
