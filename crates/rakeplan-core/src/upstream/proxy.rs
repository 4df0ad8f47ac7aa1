//! Envelope normalization for proxied reads, writes and downloads.

use std::time::Duration;

use serde_json::Value;

use super::{
    AckStatus, Acknowledgement, DatasetName, Envelope, Method, Resource, Upstream,
    UpstreamRequest, UpstreamResponse,
};
use crate::error::{PlannerError, Result};

/// Message for any body that is not a valid success envelope.
pub const MALFORMED_RESPONSE: &str = "Malformed response from optimizer service";

/// Service path of the plan download.
const DOWNLOAD_PATH: &str = "download-plan";

fn fetch_failed(resource: &str, details: String) -> PlannerError {
    PlannerError::upstream(
        format!("Failed to fetch {resource} from optimizer service"),
        Some(details),
    )
}

fn status_details(response: &UpstreamResponse) -> String {
    format!("HTTP {}: {}", response.status, response.text())
}

/// Reads a resource and validates it.
///
/// Returns the upstream `data` untouched (unknown fields included) once it
/// has been checked against the resource's record types.
///
/// # Errors
///
/// Returns `PlannerError::Upstream` when the service is unreachable,
/// answers with a non-2xx status or an error envelope, or sends anything
/// that does not validate.
pub async fn fetch_resource(
    upstream: &dyn Upstream,
    resource: Resource,
    query: Vec<(String, String)>,
    timeout: Option<Duration>,
) -> Result<Value> {
    let mut request = UpstreamRequest::get(resource.path()).with_query(query);
    if let Some(timeout) = timeout {
        request = request.with_timeout(timeout);
    }

    let response = upstream.send(request).await.map_err(|e| {
        log::warn!("fetching {} failed: {e}", resource.path());
        fetch_failed(resource.label(), e.to_string())
    })?;
    if !response.is_success() {
        log::warn!("{} answered HTTP {}", resource.path(), response.status);
        return Err(fetch_failed(resource.label(), status_details(&response)));
    }

    let envelope: Envelope<Value> = serde_json::from_slice(&response.body).map_err(|e| {
        log::error!("{} returned an unreadable body: {e}", resource.path());
        PlannerError::upstream(MALFORMED_RESPONSE, Some(e.to_string()))
    })?;

    match envelope {
        Envelope::Success { data } => {
            resource.validate(&data).map_err(|e| {
                log::error!("{} returned invalid records: {e}", resource.path());
                PlannerError::upstream(MALFORMED_RESPONSE, Some(e.to_string()))
            })?;
            Ok(data)
        }
        Envelope::Error { message, details } => {
            log::warn!("{} reported an error: {message}", resource.path());
            Err(PlannerError::upstream(message, details))
        }
    }
}

/// Forwards a dataset bulk-replace and relays the service's reply.
///
/// The body is forwarded as-is with the caller's method; only its being
/// JSON is checked (by the caller, when parsing it).
pub async fn write_dataset(
    upstream: &dyn Upstream,
    name: DatasetName,
    method: Method,
    body: Value,
) -> Result<Acknowledgement> {
    let path = format!("datasets/{name}");
    let update_failed = |details: String| {
        PlannerError::upstream(
            format!("Failed to update {name} on optimizer service"),
            Some(details),
        )
    };

    let response = upstream
        .send(UpstreamRequest::write(method, path, body))
        .await
        .map_err(|e| {
            log::warn!("{} datasets/{name} failed: {e}", method.as_str());
            update_failed(e.to_string())
        })?;

    let ack = serde_json::from_slice::<Acknowledgement>(&response.body).ok();
    match ack {
        Some(ack) if response.is_success() && ack.status == AckStatus::Success => {
            log::info!("dataset {name} replaced via {}", method.as_str());
            Ok(ack)
        }
        Some(Acknowledgement {
            status: AckStatus::Error,
            message,
            details,
        }) => Err(PlannerError::upstream(
            message.unwrap_or_else(|| format!("Optimizer service rejected {name} update")),
            details,
        )),
        _ if !response.is_success() => Err(update_failed(status_details(&response))),
        _ => Err(PlannerError::upstream(
            MALFORMED_RESPONSE,
            Some(response.text()),
        )),
    }
}

/// A binary artifact and the headers it was served with.
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub bytes: Vec<u8>,
}

/// Fetches the optimizer's plan document without looking inside it.
pub async fn download_plan(
    upstream: &dyn Upstream,
    query: Vec<(String, String)>,
) -> Result<Download> {
    let response = upstream
        .send(UpstreamRequest::get(DOWNLOAD_PATH).with_query(query))
        .await
        .map_err(|e| {
            log::warn!("plan download failed: {e}");
            fetch_failed("plan download", e.to_string())
        })?;
    if !response.is_success() {
        return Err(fetch_failed("plan download", status_details(&response)));
    }

    Ok(Download {
        content_type: response.content_type,
        content_disposition: response.content_disposition,
        bytes: response.body,
    })
}
