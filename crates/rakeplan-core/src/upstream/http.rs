//! reqwest-backed transport to the optimizer service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};

use super::{Method, TransportError, Upstream, UpstreamRequest, UpstreamResponse};
use crate::error::{PlannerError, Result};

/// HTTP transport rooted at the service's base URL.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    http: reqwest::Client,
    base_url: String,
}

impl HttpUpstream {
    /// Creates a client whose requests time out after `timeout` unless a
    /// request sets its own.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("rakeplan/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                PlannerError::configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn header(response: &reqwest::Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn send(&self, request: UpstreamRequest) -> std::result::Result<UpstreamResponse, TransportError> {
        let url = self.url(&request.path);
        let mut builder = match request.method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
            Method::Put => self.http.put(&url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        log::debug!("{} {url}", request.method.as_str());
        let response = builder
            .send()
            .await
            .map_err(|e| TransportError(format!("Request failed: {e}")))?;

        let status = response.status().as_u16();
        let content_type = header(&response, CONTENT_TYPE);
        let content_disposition = header(&response, CONTENT_DISPOSITION);
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError(format!("Failed to read response: {e}")))?
            .to_vec();

        Ok(UpstreamResponse {
            status,
            content_type,
            content_disposition,
            body,
        })
    }
}
