//! Access to the external optimizer service.
//!
//! Everything the planner needs from the service goes through the
//! [`Upstream`] transport trait: proxied dataset reads and writes, plan
//! downloads, and the optimization runs themselves (via
//! [`UpstreamOptimizer`]). [`HttpUpstream`] is the reqwest-backed
//! implementation; tests substitute in-memory fakes.
//!
//! Responses are normalized at this boundary. A read either yields data
//! that validated against the resource's record types or a
//! [`PlannerError::Upstream`](crate::PlannerError::Upstream) carrying a
//! generic message and the raw upstream text as details.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub mod envelope;
pub mod http;
pub mod optimizer;
pub mod proxy;
pub mod records;

pub use envelope::{AckStatus, Acknowledgement, Envelope};
pub use http::HttpUpstream;
pub use optimizer::{Optimizer, UpstreamOptimizer};
pub use proxy::{download_plan, fetch_resource, write_dataset, Download};
pub use records::{DatasetName, OptimizedPlan, RecordId, Resource};

/// HTTP methods the planner uses against the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

/// A request to the service, relative to its base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub method: Method,
    /// Path without leading slash, e.g. `get-optimized-plan`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    /// Overrides the transport's default timeout
    pub timeout: Option<Duration>,
}

impl UpstreamRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn write(method: Method, path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
            timeout: None,
        }
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A raw response from the service.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpstreamResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub body: Vec<u8>,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text for diagnostics.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The service could not be reached or the exchange broke off.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Transport to the optimizer service.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Performs one request. Non-2xx statuses are responses, not errors.
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError>;
}
