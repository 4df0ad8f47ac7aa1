//! Plan store operations for the Planner.

use jiff::civil::Date;

use super::{today, Planner};
use crate::{
    error::{PlannerError, Result},
    export,
    models::{AuditEntry, ExportFormat, Kpis, LockOutcome, Plan, PlanRow},
    params::{EditRow, Simulate},
    simulation::{self, SimulatedPlan},
};

impl Planner {
    /// Retrieves the current plan for a date.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::PlanNotFound` when nothing was ever stored for
    /// the date. A stored plan with no rows is returned as is.
    pub async fn get_plan(&self, date: Date) -> Result<Plan> {
        self.with_db(move |db| db.get_plan(date))
            .await?
            .ok_or(PlannerError::PlanNotFound { date })
    }

    /// Replaces the plan for a date, bumping its revision.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::PlanLocked` if the plan for the date is locked.
    pub async fn put_plan(&self, date: Date, rows: Vec<PlanRow>) -> Result<Plan> {
        let _guard = self.lock_date(date).await;
        let plan = self.with_db(move |db| db.put_plan(date, rows)).await?;
        log::debug!("stored {} with {} rows", plan.plan_id, plan.rows.len());
        Ok(plan)
    }

    /// Locks the plan for a date and writes its CSV and PDF exports.
    ///
    /// Locking an already locked plan re-exports it. The exports are
    /// written before the lock commits, so a failed export leaves the plan
    /// unlocked.
    pub async fn lock_plan(&self, date: Date) -> Result<LockOutcome> {
        let _guard = self.lock_date(date).await;
        let exports_dir = self.exports_dir.clone();

        let (plan, exported) = self
            .with_db(move |db| {
                db.lock_plan_with(date, |plan| export::write_exports(&exports_dir, plan))?
                    .ok_or(PlannerError::PlanNotFound { date })
            })
            .await?;

        log::info!("locked {} and exported to {}", plan.plan_id, self.exports_dir.display());
        Ok(LockOutcome {
            ok: true,
            date,
            message: "Plan locked".to_string(),
            exported,
        })
    }

    /// Reads an export artifact written by [`lock_plan`](Self::lock_plan).
    pub async fn export_plan(&self, date: Date, format: ExportFormat) -> Result<Vec<u8>> {
        let exports_dir = self.exports_dir.clone();
        tokio::task::spawn_blocking(move || export::read_export(&exports_dir, date, format))
            .await
            .map_err(PlannerError::join)?
    }

    /// Applies a manual override to one row of the plan for a date.
    ///
    /// The audit entry and the edited plan are committed together. The
    /// edited row becomes `Pending` until the next optimization.
    pub async fn edit_plan_row(
        &self,
        date: Date,
        row_id: u32,
        params: &EditRow,
    ) -> Result<(Plan, AuditEntry)> {
        let (user, reason) = params.validate()?;
        let edit = params.edit.clone();

        let _guard = self.lock_date(date).await;
        let (plan, entry) = self
            .with_db(move |db| db.edit_plan_row(date, row_id, &edit, &user, &reason))
            .await?;

        log::info!(
            "row {row_id} of {} edited by {} (audit #{})",
            plan.plan_id,
            entry.user,
            entry.id
        );
        Ok((plan, entry))
    }

    /// Headline indicators for the plan of a date.
    pub async fn kpis(&self, date: Date) -> Result<Kpis> {
        let plan = self.get_plan(date).await?;
        Ok(Kpis::from(&plan))
    }

    /// Runs a what-if simulation against the stored plan.
    ///
    /// With `commit` set the simulated rows become the current plan; the
    /// returned plan is then the stored revision. Otherwise nothing is
    /// written.
    pub async fn simulate(&self, params: &Simulate) -> Result<SimulatedPlan> {
        let delta = params.delta()?;
        let date = params.date.unwrap_or_else(today);

        if !params.commit {
            let plan = self.get_plan(date).await?;
            return Ok(simulation::simulate(&plan, &delta));
        }

        let _guard = self.lock_date(date).await;
        let plan = self.get_plan(date).await?;
        if plan.locked {
            return Err(PlannerError::PlanLocked { date });
        }
        let simulated = simulation::simulate(&plan, &delta);

        let rows = simulated.plan.rows.clone();
        let stored = self.with_db(move |db| db.put_plan(date, rows)).await?;
        log::info!(
            "committed simulation as {} (cost delta {:.2})",
            stored.plan_id,
            simulated.deltas.cost_delta
        );

        Ok(SimulatedPlan {
            plan: stored,
            deltas: simulated.deltas,
        })
    }
}
