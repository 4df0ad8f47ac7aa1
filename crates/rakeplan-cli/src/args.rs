use std::{path::PathBuf, time::Duration};

use clap::{Args as ClapArgs, Parser, Subcommand};
use jiff::civil::Date;
use rakeplan_core::{
    config::{
        DEFAULT_JOB_RETENTION, DEFAULT_OPTIMIZER_URL, DEFAULT_PORT, DEFAULT_UPSTREAM_TIMEOUT,
        DEFAULT_WORKERS,
    },
    models::RowEdit,
    params::{AppendAudit, EditRow, JobId, Simulate, SubmitOptimization},
    ServerConfig,
};

/// Rake dispatch planning server and client
///
/// Runs the planning API (`serve`), submits optimizations to a running
/// server (`submit`), and inspects the local plan store, job registry and
/// audit log.
#[derive(Parser)]
#[command(version, about, name = "rakeplan")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/rakeplan/rakeplan.db
    #[arg(long, global = true, env = "RAKEPLAN_DATABASE_FILE")]
    pub database_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve(ServeArgs),
    /// Submit an optimization to a running server and wait for the plan
    Submit(SubmitArgs),
    /// Inspect or lock stored plans
    #[command(alias = "p")]
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Inspect or cancel optimization jobs
    #[command(alias = "j")]
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Read the audit log
    Audit {
        #[command(subcommand)]
        command: AuditCommands,
    },
}

#[derive(ClapArgs)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "RAKEPLAN_LISTEN", default_value_t = format!("0.0.0.0:{DEFAULT_PORT}"))]
    pub listen: String,
    /// Base URL of the external optimizer service
    #[arg(long, env = "RAKEPLAN_OPTIMIZER_URL", default_value = DEFAULT_OPTIMIZER_URL)]
    pub optimizer_url: String,
    /// Number of optimization workers
    #[arg(long, env = "RAKEPLAN_WORKERS", default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,
    /// Directory for lock exports. Defaults to `exports` next to the database
    #[arg(long, env = "RAKEPLAN_EXPORTS_DIR")]
    pub exports_dir: Option<PathBuf>,
    /// Hours a finished job stays pollable
    #[arg(long, env = "RAKEPLAN_JOB_RETENTION_HOURS", default_value_t = DEFAULT_JOB_RETENTION.as_secs() / 3600)]
    pub job_retention_hours: u64,
    /// Timeout for proxied requests, in seconds
    #[arg(long, env = "RAKEPLAN_UPSTREAM_TIMEOUT_SECS", default_value_t = DEFAULT_UPSTREAM_TIMEOUT.as_secs())]
    pub upstream_timeout_secs: u64,
    /// Message answered by /api/ping
    #[arg(long, env = "RAKEPLAN_PING_MESSAGE", default_value = "ping")]
    pub ping_message: String,
}

impl ServeArgs {
    pub fn to_config(&self) -> rakeplan_core::Result<ServerConfig> {
        Ok(ServerConfig::new()
            .with_listen(&self.listen)?
            .with_optimizer_url(&self.optimizer_url)?
            .with_workers(self.workers)?
            .with_job_retention(Duration::from_secs(self.job_retention_hours * 3600))
            .with_upstream_timeout(Duration::from_secs(self.upstream_timeout_secs)))
    }
}

#[derive(ClapArgs)]
pub struct SubmitArgs {
    /// Base URL of the planning server
    #[arg(long, env = "RAKEPLAN_SERVER", default_value = "http://localhost:8080")]
    pub server: String,
    /// Planning horizon in hours
    #[arg(long)]
    pub horizon_hours: Option<u32>,
    /// Ignore the demand forecast
    #[arg(long)]
    pub no_forecast: bool,
    /// Quick mode: shorter solver budget
    #[arg(long)]
    pub quick: bool,
    /// Solver budget in seconds
    #[arg(long)]
    pub time_limit_seconds: Option<u32>,
    /// Plan date (YYYY-MM-DD), defaults to today on the server
    #[arg(long)]
    pub date: Option<Date>,
    /// Delay between polls, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub poll_interval_ms: u64,
    /// Give up when the job has not finished after this many seconds
    #[arg(long, default_value_t = 300)]
    pub max_wait_secs: u64,
}

impl From<&SubmitArgs> for SubmitOptimization {
    fn from(val: &SubmitArgs) -> Self {
        SubmitOptimization {
            horizon_hours: val.horizon_hours,
            use_forecast: val.no_forecast.then_some(false),
            quick: val.quick,
            time_limit_seconds: val.time_limit_seconds,
            date: val.date,
        }
    }
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Show the plan stored for a date
    #[command(alias = "s")]
    Show(DateArg),
    /// Lock the plan for a date and write its CSV and PDF exports
    Lock(DateArg),
    /// Show headline indicators for a date
    Kpis(DateArg),
    /// Override one row of a plan, recording the reason in the audit log
    #[command(alias = "e")]
    Edit(EditRowArgs),
    /// Preview the effect of a delay or load change
    Simulate(SimulateArgs),
}

#[derive(ClapArgs)]
pub struct DateArg {
    /// Plan date (YYYY-MM-DD), defaults to today
    pub date: Option<Date>,
}

#[derive(ClapArgs)]
pub struct EditRowArgs {
    /// Plan date (YYYY-MM-DD)
    pub date: Date,
    /// Row id within the plan
    pub row_id: u32,
    /// Why the row is being overridden
    #[arg(short, long)]
    pub reason: String,
    /// Who is making the change
    #[arg(short, long, env = "RAKEPLAN_USER")]
    pub user: Option<String>,
    /// New source stockyard
    #[arg(long)]
    pub source: Option<String>,
    /// New destinations as a comma-separated list
    #[arg(long, value_delimiter = ',')]
    pub destinations: Option<Vec<String>>,
    /// New quantity in tonnes
    #[arg(long)]
    pub quantity: Option<f64>,
}

impl From<&EditRowArgs> for EditRow {
    fn from(val: &EditRowArgs) -> Self {
        EditRow {
            user: val.user.clone(),
            reason: val.reason.clone(),
            edit: RowEdit {
                cmo_stockyard_location_id: val.source.clone(),
                destinations: val.destinations.clone(),
                quantity_tonnes: val.quantity,
            },
            reoptimize: false,
        }
    }
}

#[derive(ClapArgs)]
pub struct SimulateArgs {
    /// Plan date (YYYY-MM-DD), defaults to today
    pub date: Option<Date>,
    /// Hypothesized delay in minutes
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub delay_min: f64,
    /// Tonnes added to each affected row
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub load_delta: f64,
    /// Only apply the delta to these rows (comma-separated ids)
    #[arg(long, value_delimiter = ',')]
    pub rows: Option<Vec<u32>>,
    /// Store the simulated plan as the current plan
    #[arg(long)]
    pub commit: bool,
}

impl From<SimulateArgs> for Simulate {
    fn from(val: SimulateArgs) -> Self {
        Simulate {
            delay_min: val.delay_min,
            load_delta: val.load_delta,
            date: val.date,
            rows: val.rows,
            commit: val.commit,
        }
    }
}

#[derive(Subcommand)]
pub enum JobCommands {
    /// Show a job's status
    #[command(alias = "s")]
    Show(JobIdArg),
    /// Cancel a queued or running job
    Cancel(JobIdArg),
}

#[derive(ClapArgs)]
pub struct JobIdArg {
    /// Job id as returned on submit
    pub id: String,
}

impl From<JobIdArg> for JobId {
    fn from(val: JobIdArg) -> Self {
        JobId { id: val.id }
    }
}

#[derive(Subcommand)]
pub enum AuditCommands {
    /// List audit entries, oldest first
    #[command(alias = "ls")]
    List,
    /// Record a manual change
    #[command(alias = "a")]
    Add(AppendAuditArgs),
}

#[derive(ClapArgs)]
pub struct AppendAuditArgs {
    /// Why the change was made
    #[arg(short, long)]
    pub reason: String,
    /// Who made the change
    #[arg(short, long, env = "RAKEPLAN_USER")]
    pub user: Option<String>,
    /// The change itself, as JSON
    #[arg(long, default_value = "{}")]
    pub change: String,
}

impl AppendAuditArgs {
    pub fn into_params(self) -> serde_json::Result<AppendAudit> {
        Ok(AppendAudit {
            user: self.user,
            reason: self.reason,
            change: serde_json::from_str(&self.change)?,
        })
    }
}
