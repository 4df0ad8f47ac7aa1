//! HTTP API server.
//!
//! Exposes the planner over axum. Optimization submits return at once and
//! run on the [`JobDispatcher`] worker pool; dataset reads and writes are
//! relayed to the optimizer service with envelope normalization.

pub mod errors;
pub mod handlers;
pub mod proxy;

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::{
    routing::{get, patch, post},
    Router,
};
use log::{error, info, warn};
use rakeplan_core::{
    upstream::{HttpUpstream, Upstream, UpstreamOptimizer},
    JobDispatcher, Planner, ServerConfig,
};
use tokio::{net::TcpListener, signal, time};

/// How often finished jobs past their retention are expired.
const PURGE_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: JobDispatcher,
    pub upstream: Arc<dyn Upstream>,
    pub ping_message: Arc<str>,
}

impl AppState {
    pub fn planner(&self) -> &Planner {
        self.dispatcher.planner()
    }
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/ping", get(handlers::ping))
        .route("/api/optimize", post(handlers::optimize))
        .route("/api/jobs/{id}", get(handlers::get_job))
        .route("/api/jobs/{id}/cancel", post(handlers::cancel_job))
        .route("/api/plans/{date}", get(handlers::get_plan))
        .route("/api/plans/{date}/rows/{row_id}", patch(handlers::edit_row))
        .route("/plans/{date}/lock", post(handlers::lock_plan))
        .route("/plans/{date}/export.csv", get(handlers::export_csv))
        .route("/plans/{date}/export.pdf", get(handlers::export_pdf))
        .route("/api/simulate", post(handlers::simulate))
        .route(
            "/api/audit",
            get(handlers::list_audit).post(handlers::append_audit),
        )
        .route("/api/kpis", get(handlers::kpis))
        .merge(proxy::routes())
        .fallback(errors::unknown_route)
        .with_state(state)
}

/// Runs the server until Ctrl-C or SIGTERM.
pub async fn serve(planner: Planner, config: ServerConfig, ping_message: String) -> Result<()> {
    let interrupted = planner
        .fail_interrupted_jobs()
        .await
        .context("Failed to recover jobs from a previous run")?;
    if interrupted > 0 {
        warn!("failed {interrupted} jobs interrupted by the previous shutdown");
    }

    let upstream: Arc<dyn Upstream> = Arc::new(
        HttpUpstream::new(config.optimizer_url.clone(), config.upstream_timeout)
            .context("Failed to create optimizer client")?,
    );
    let optimizer = Arc::new(UpstreamOptimizer::new(Arc::clone(&upstream)));
    let (dispatcher, workers) = JobDispatcher::start(planner.clone(), optimizer, config.workers);
    let purger = tokio::spawn(purge_expired_jobs(planner, config.job_retention));

    let app = router(AppState {
        dispatcher,
        upstream,
        ping_message: ping_message.into(),
    });

    let listener = TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen))?;
    info!(
        "listening on {} with {} workers, optimizer at {}",
        config.listen, config.workers, config.optimizer_url
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    // Running jobs are dropped; the next start marks them interrupted
    purger.abort();
    for worker in workers {
        worker.abort();
    }
    info!("server stopped");
    Ok(())
}

async fn purge_expired_jobs(planner: Planner, retention: Duration) {
    let mut ticker = time::interval(PURGE_INTERVAL);
    loop {
        ticker.tick().await;
        if let Err(e) = planner.purge_expired_jobs(retention).await {
            error!("failed to purge expired jobs: {e}");
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    info!("shutdown requested");
}
