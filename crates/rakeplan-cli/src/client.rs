//! HTTP client for a running planning server.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use rakeplan_core::{
    models::{JobView, Plan, SubmittedJob},
    params::SubmitOptimization,
    upstream::Envelope,
};
use serde::de::DeserializeOwned;
use tokio::time::{self, Instant};

/// Client for the planning API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn submit(&self, params: &SubmitOptimization) -> Result<SubmittedJob> {
        let resp = self
            .http
            .post(self.url("/api/optimize"))
            .query(&[("quick", params.quick)])
            .json(params)
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", self.base_url))?;
        decode(resp).await
    }

    pub async fn poll(&self, job_id: &str) -> Result<JobView> {
        let resp = self
            .http
            .get(self.url(&format!("/api/jobs/{job_id}")))
            .send()
            .await
            .with_context(|| format!("Failed to poll job {job_id}"))?;
        decode(resp).await
    }

    /// Fetches the plan a completed job points at.
    pub async fn plan(&self, result_url: &str) -> Result<Plan> {
        let resp = self
            .http
            .get(self.url(result_url))
            .send()
            .await
            .with_context(|| format!("Failed to fetch {result_url}"))?;
        decode(resp).await
    }
}

/// Decodes a success body, or turns an error envelope into an error.
async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    let bytes = resp.bytes().await.context("Failed to read response")?;

    if !status.is_success() {
        return match serde_json::from_slice::<Envelope<serde_json::Value>>(&bytes) {
            Ok(Envelope::Error {
                message,
                details: Some(details),
            }) => bail!("{message} ({details})"),
            Ok(Envelope::Error { message, .. }) => bail!("{message}"),
            _ => bail!("HTTP {status}: {}", String::from_utf8_lossy(&bytes)),
        };
    }
    serde_json::from_slice(&bytes).context("Unexpected response body")
}

/// How to wait for a job.
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_wait: Duration,
}

/// Polls until the job is terminal or `max_wait` has passed.
///
/// # Errors
///
/// Fails with "job stalled" when the job is still pending at the deadline.
pub async fn wait_for_job(client: &ApiClient, job_id: &str, settings: PollSettings) -> Result<JobView> {
    let deadline = Instant::now() + settings.max_wait;
    let mut furthest = 0;

    loop {
        let view = client.poll(job_id).await?;
        if view.status.rank() < furthest {
            log::warn!("job {job_id} went back to {}", view.status);
        }
        furthest = furthest.max(view.status.rank());

        if view.status.is_terminal() {
            return Ok(view);
        }
        if Instant::now() >= deadline {
            bail!(
                "job stalled: {job_id} still {} after {}s",
                view.status,
                settings.max_wait.as_secs()
            );
        }
        log::debug!("job {job_id} is {} ({}%)", view.status, view.progress);
        time::sleep(settings.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use axum::{extract::Path, routing::get, Json, Router};
    use serde_json::{json, Value};

    use super::*;

    /// Serves a router on an ephemeral port and returns its base URL.
    async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn settings(max_wait_ms: u64) -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(10),
            max_wait: Duration::from_millis(max_wait_ms),
        }
    }

    #[tokio::test]
    async fn test_job_that_never_finishes_stalls() {
        let router = Router::new().route(
            "/api/jobs/{id}",
            get(|Path(id): Path<String>| async move {
                Json(json!({"job_id": id, "status": "running", "progress": 50}))
            }),
        );
        let client = ApiClient::new(&spawn_server(router).await).unwrap();

        let err = wait_for_job(&client, "job-1", settings(100)).await.unwrap_err();
        assert!(err.to_string().starts_with("job stalled: job-1 still running"));
    }

    #[tokio::test]
    async fn test_terminal_job_is_returned() {
        let router = Router::new().route(
            "/api/jobs/{id}",
            get(|Path(id): Path<String>| async move {
                Json(json!({"job_id": id, "status": "failed", "progress": 100, "error": "cancelled"}))
            }),
        );
        let client = ApiClient::new(&spawn_server(router).await).unwrap();

        let view = wait_for_job(&client, "job-2", settings(1_000)).await.unwrap();
        assert_eq!(view.error.as_deref(), Some("cancelled"));
    }

    #[tokio::test]
    async fn test_error_envelope_becomes_error_message() {
        let router = Router::new().route(
            "/api/jobs/{id}",
            get(|| async {
                (
                    axum::http::StatusCode::GONE,
                    Json::<Value>(json!({"status": "error", "message": "Job old has expired and is no longer tracked"})),
                )
            }),
        );
        let client = ApiClient::new(&spawn_server(router).await).unwrap();

        let err = client.poll("old").await.unwrap_err();
        assert_eq!(err.to_string(), "Job old has expired and is no longer tracked");
    }
}
