//! rakeplan: rake dispatch planning server and command-line client.

mod args;
mod cli;
mod client;
mod http;
mod renderer;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use args::{Args, Commands, SubmitArgs};
use clap::Parser;
use cli::Cli;
use client::{wait_for_job, ApiClient, PollSettings};
use log::info;
use rakeplan_core::{models::JobStatus, params::SubmitOptimization, Planner, PlannerBuilder};
use renderer::TerminalRenderer;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        no_color,
        command,
    } = Args::parse();
    let renderer = TerminalRenderer::new(!no_color);

    match command {
        Commands::Serve(serve) => {
            let config = serve.to_config().context("Invalid server configuration")?;
            let planner = open_planner(database_file, serve.exports_dir).await?;
            info!("rakeplan server starting");
            http::serve(planner, config, serve.ping_message).await
        }
        Commands::Submit(submit) => run_submit(&submit, &renderer).await,
        Commands::Plan { command } => {
            Cli::new(open_planner(database_file, None).await?, renderer)
                .handle_plan_command(command)
                .await
        }
        Commands::Job { command } => {
            Cli::new(open_planner(database_file, None).await?, renderer)
                .handle_job_command(command)
                .await
        }
        Commands::Audit { command } => {
            Cli::new(open_planner(database_file, None).await?, renderer)
                .handle_audit_command(command)
                .await
        }
    }
}

async fn open_planner(
    database_file: Option<PathBuf>,
    exports_dir: Option<PathBuf>,
) -> Result<Planner> {
    PlannerBuilder::new()
        .with_database_path(database_file)
        .with_exports_dir(exports_dir)
        .build()
        .await
        .context("Failed to initialize planner")
}

/// Submits to a running server, waits, and prints the resulting plan.
async fn run_submit(args: &SubmitArgs, renderer: &TerminalRenderer) -> Result<()> {
    let client = ApiClient::new(&args.server)?;
    let submitted = client.submit(&SubmitOptimization::from(args)).await?;
    info!(
        "submitted job {} with a {}s solver budget",
        submitted.job_id, submitted.time_limit_seconds
    );

    let settings = PollSettings {
        interval: Duration::from_millis(args.poll_interval_ms),
        max_wait: Duration::from_secs(args.max_wait_secs),
    };
    let view = wait_for_job(&client, &submitted.job_id, settings).await?;

    match (view.status, view.result_url) {
        (JobStatus::Completed, Some(result_url)) => {
            let plan = client.plan(&result_url).await?;
            renderer.render(&plan.to_string())
        }
        (JobStatus::Completed, None) => bail!("job {} completed without a plan", view.job_id),
        (status, _) => bail!(
            "job {} {status}: {}",
            view.job_id,
            view.error.as_deref().unwrap_or("no error reported")
        ),
    }
}
