//! Local command handlers.
//!
//! These commands open the database directly, so they work whether or not a
//! server is running against the same file.

use anyhow::{Context, Result};
use rakeplan_core::{
    display::{AuditEntries, EditResult, OperationStatus},
    models::JobStatus,
    params::{EditRow, JobId},
    planner::{job_ops::CANCELLED, today},
    Planner,
};

use crate::{
    args::{AuditCommands, JobCommands, PlanCommands},
    renderer::TerminalRenderer,
};

pub struct Cli {
    planner: Planner,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(planner: Planner, renderer: TerminalRenderer) -> Self {
        Self { planner, renderer }
    }

    pub async fn handle_plan_command(&self, command: PlanCommands) -> Result<()> {
        match command {
            PlanCommands::Show(arg) => {
                let plan = self.planner.get_plan(arg.date.unwrap_or_else(today)).await?;
                self.renderer.render(&plan.to_string())
            }
            PlanCommands::Lock(arg) => {
                let outcome = self
                    .planner
                    .lock_plan(arg.date.unwrap_or_else(today))
                    .await
                    .context("Failed to lock plan")?;
                self.renderer.render(&outcome.to_string())?;
                self.renderer
                    .render(&format!("Exports in {}\n", self.planner.exports_dir().display()))
            }
            PlanCommands::Kpis(arg) => {
                let kpis = self.planner.kpis(arg.date.unwrap_or_else(today)).await?;
                self.renderer.render(&kpis.to_string())
            }
            PlanCommands::Edit(args) => {
                let (plan, entry) = self
                    .planner
                    .edit_plan_row(args.date, args.row_id, &EditRow::from(&args))
                    .await?;
                self.renderer
                    .render(&EditResult::new(plan, entry).to_string())
            }
            PlanCommands::Simulate(args) => {
                let simulated = self.planner.simulate(&args.into()).await?;
                self.renderer.render(&simulated.to_string())
            }
        }
    }

    pub async fn handle_job_command(&self, command: JobCommands) -> Result<()> {
        match command {
            JobCommands::Show(arg) => {
                let job = self.planner.get_job(&arg.into()).await?;
                self.renderer.render(&job.to_string())
            }
            JobCommands::Cancel(arg) => {
                let id = JobId::from(arg);
                let view = self.planner.cancel_job(&id).await?;
                let status = match view.status {
                    JobStatus::Failed if view.error.as_deref() == Some(CANCELLED) => {
                        OperationStatus::success(format!("Job {} cancelled", id.id))
                    }
                    status => OperationStatus::failure(format!(
                        "Job {} had already finished ({status})",
                        id.id
                    )),
                };
                self.renderer.render(&status.to_string())
            }
        }
    }

    pub async fn handle_audit_command(&self, command: AuditCommands) -> Result<()> {
        match command {
            AuditCommands::List => {
                let entries = AuditEntries(self.planner.list_audit().await?);
                self.renderer.render(&entries.to_string())
            }
            AuditCommands::Add(args) => {
                let params = args.into_params().context("Invalid --change JSON")?;
                let entry = self.planner.append_audit(&params).await?;
                self.renderer.render(&entry.to_string())
            }
        }
    }
}
