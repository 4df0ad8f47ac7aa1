//! Runtime settings for the planning server.

use std::{
    net::{Ipv4Addr, SocketAddr},
    time::Duration,
};

use crate::error::{PlannerError, Result};

/// Port the server binds on all interfaces when none is configured.
pub const DEFAULT_PORT: u16 = 8080;
/// External optimizer service used when none is configured.
pub const DEFAULT_OPTIMIZER_URL: &str = "http://localhost:8000";
/// Optimization workers started when none is configured.
pub const DEFAULT_WORKERS: usize = 2;
/// How long finished jobs stay pollable.
pub const DEFAULT_JOB_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);
/// Timeout for proxied reads and writes.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);
/// Slack granted to a job on top of its solver time limit.
pub const JOB_GRACE: Duration = Duration::from_secs(5);

/// Validated server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    /// Base URL of the external optimizer service
    pub optimizer_url: String,
    pub workers: usize,
    pub job_retention: Duration,
    pub upstream_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            optimizer_url: DEFAULT_OPTIMIZER_URL.to_string(),
            workers: DEFAULT_WORKERS,
            job_retention: DEFAULT_JOB_RETENTION,
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listen(mut self, listen: &str) -> Result<Self> {
        self.listen = parse_listen(listen)?;
        Ok(self)
    }

    /// Sets the optimizer base URL, dropping any trailing slash.
    pub fn with_optimizer_url(mut self, url: &str) -> Result<Self> {
        let url = url.trim().trim_end_matches('/');
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(PlannerError::configuration(format!(
                "optimizer URL must be http(s), got '{url}'"
            )));
        }
        self.optimizer_url = url.to_string();
        Ok(self)
    }

    pub fn with_workers(mut self, workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(PlannerError::configuration("at least one worker is required"));
        }
        self.workers = workers;
        Ok(self)
    }

    pub fn with_job_retention(mut self, retention: Duration) -> Self {
        self.job_retention = retention;
        self
    }

    pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }
}

fn parse_listen(listen: &str) -> Result<SocketAddr> {
    listen.parse().map_err(|e| {
        PlannerError::configuration(format!("invalid listen address '{listen}': {e}"))
    })
}
