//! Display implementations for domain models.
//!
//! Output is markdown so the CLI can render it with termimad or print it
//! plain.

use std::fmt;

use super::datetime::{Elapsed, LocalDateTime};
use crate::models::{AuditEntry, JobStatus, Kpis, OptimizationJob, Plan, RowStatus};

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Plan {}", self.plan_id)?;
        writeln!(f)?;
        writeln!(f, "- Date: {}", self.date)?;
        writeln!(f, "- Revision: {}", self.revision)?;
        writeln!(
            f,
            "- Locked: {}",
            if self.locked { "yes" } else { "no" }
        )?;
        writeln!(f, "- Generated: {}", LocalDateTime(&self.generated_at))?;
        writeln!(f, "- Total cost: {:.2}", self.summary.total_cost)?;
        writeln!(
            f,
            "- Average utilization: {:.1}%",
            self.summary.avg_utilization * 100.0
        )?;

        if self.rows.is_empty() {
            writeln!(f, "\nNo rakes in this plan.")?;
            return Ok(());
        }

        writeln!(f, "\n## Rakes")?;
        writeln!(f)?;
        writeln!(
            f,
            "| # | Source | Destinations | Product | Customer | Tonnes | Wagons | Cost | Status |"
        )?;
        writeln!(f, "|---|---|---|---|---|---:|---:|---:|---|")?;
        for row in &self.rows {
            writeln!(
                f,
                "| {} | {} | {} | {} | {} | {:.0} | {} | {:.2} | {} |",
                row.row_id,
                row.cmo_stockyard_location_id,
                row.destinations.join(", "),
                row.product_id,
                row.customer_id,
                row.quantity_tonnes,
                row.wagons_used,
                row.total_cost,
                row.status.with_icon()
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for OptimizationJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Job {}", self.id)?;
        writeln!(f)?;
        writeln!(f, "- Status: {} ({}%)", self.status, self.progress())?;
        writeln!(f, "- Plan date: {}", self.request.date)?;
        writeln!(
            f,
            "- Horizon: {}h, forecast: {}, quick: {}",
            self.request.horizon_hours,
            if self.request.use_forecast { "yes" } else { "no" },
            if self.request.quick { "yes" } else { "no" }
        )?;
        writeln!(f, "- Time limit: {}s", self.request.time_limit_seconds)?;
        writeln!(f, "- Submitted: {}", LocalDateTime(&self.submitted_at))?;
        if let Some(started_at) = &self.started_at {
            writeln!(f, "- Started: {}", LocalDateTime(started_at))?;
        }
        if let Some(completed_at) = &self.completed_at {
            writeln!(f, "- Finished: {}", LocalDateTime(completed_at))?;
            let from = self.started_at.unwrap_or(self.submitted_at);
            writeln!(f, "- Run time: {}", Elapsed { from, to: *completed_at })?;
        }
        if let Some(url) = self.result_url() {
            writeln!(f, "- Result: {url}")?;
        }
        if let Some(error) = &self.error {
            writeln!(f, "- Error: {error}")?;
        }
        Ok(())
    }
}

impl fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "### #{} {} at {}",
            self.id,
            self.user,
            LocalDateTime(&self.timestamp)
        )?;
        writeln!(f)?;
        writeln!(f, "{}", self.reason)?;
        if !self.change.is_null() {
            writeln!(f)?;
            writeln!(f, "```json")?;
            writeln!(
                f,
                "{}",
                serde_json::to_string_pretty(&self.change).map_err(|_| fmt::Error)?
            )?;
            writeln!(f, "```")?;
        }
        Ok(())
    }
}

impl fmt::Display for Kpis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# KPIs for {}", self.date)?;
        writeln!(f)?;
        writeln!(f, "- Total cost: {:.2}", self.total_cost)?;
        writeln!(f, "- Average utilization: {:.1}%", self.avg_utilization * 100.0)?;
        writeln!(f, "- Active rakes: {}", self.active_rakes)?;
        writeln!(f, "- Delayed rakes: {}", self.delayed_rakes)?;
        writeln!(f, "- On time: {:.1}%", self.on_time_pct)
    }
}
