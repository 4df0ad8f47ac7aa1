//! Conversion of planner errors into error envelopes.

use axum::{
    extract::rejection::QueryRejection,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use rakeplan_core::{upstream::Envelope, PlannerError};

/// An error response carrying the `{status: "error", message, details?}`
/// body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
            details: None,
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request("Invalid query string", Some(rejection.body_text()))
    }
}

/// Answers requests no route matched.
pub async fn unknown_route(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body: Envelope<()> = Envelope::error(self.message, self.details);
        (self.status, Json(body)).into_response()
    }
}

impl From<PlannerError> for ApiError {
    fn from(err: PlannerError) -> Self {
        let status = match &err {
            PlannerError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            PlannerError::PlanNotFound { .. }
            | PlannerError::JobNotFound { .. }
            | PlannerError::ExportNotFound { .. } => StatusCode::NOT_FOUND,
            PlannerError::PlanLocked { .. } => StatusCode::CONFLICT,
            PlannerError::StaleJob { .. } => StatusCode::GONE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        match err {
            PlannerError::Upstream { message, details } => Self {
                status,
                message,
                details,
            },
            other => {
                if !other.is_client_error() {
                    log::error!("request failed: {other}");
                }
                Self {
                    status,
                    message: other.to_string(),
                    details: None,
                }
            }
        }
    }
}
