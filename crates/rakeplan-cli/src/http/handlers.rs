//! Handlers for the planning endpoints.

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use jiff::civil::Date;
use rakeplan_core::{
    models::{AuditEntry, ExportFormat, JobView, Kpis, LockOutcome, Plan, SubmittedJob},
    params::{AppendAudit, EditRow, JobId, Simulate, SubmitOptimization},
    planner::today,
    simulation::SimulatedPlan,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

use super::{errors::ApiError, AppState};

type ApiResult<T> = Result<T, ApiError>;

/// Query string extraction that reports failures as an error envelope.
pub(super) type QueryParams<T> = Result<Query<T>, QueryRejection>;

/// Parses an optional JSON body; an empty body yields the defaults.
pub(super) fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> ApiResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request("Invalid JSON body", Some(e.to_string())))
}

fn parse_date(raw: &str) -> ApiResult<Date> {
    raw.parse().map_err(|e: jiff::Error| {
        ApiError::bad_request(format!("Invalid date: {raw}"), Some(e.to_string()))
    })
}

pub async fn ping(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "message": state.ping_message.as_ref() }))
}

#[derive(Debug, Default, Deserialize)]
pub struct OptimizeQuery {
    #[serde(default)]
    quick: bool,
}

pub async fn optimize(
    State(state): State<AppState>,
    query: QueryParams<OptimizeQuery>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<SubmittedJob>)> {
    let Query(query) = query?;
    let mut params: SubmitOptimization = parse_body(&body)?;
    params.quick |= query.quick;

    let job = state.dispatcher.submit(params).await?;
    Ok((StatusCode::ACCEPTED, Json(SubmittedJob::from(&job))))
}

pub async fn get_job(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<JobView>> {
    Ok(Json(state.planner().poll_job(&JobId { id }).await?))
}

pub async fn cancel_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<JobView>> {
    Ok(Json(state.planner().cancel_job(&JobId { id }).await?))
}

pub async fn get_plan(State(state): State<AppState>, Path(date): Path<String>) -> ApiResult<Json<Plan>> {
    let date = parse_date(&date)?;
    Ok(Json(state.planner().get_plan(date).await?))
}

/// Plan after a manual edit, with the id of the re-optimization job if one
/// was requested. The edit is committed even when queueing the
/// re-optimization fails; `reoptimize_error` then says why.
#[derive(Debug, Serialize)]
pub struct EditedPlan {
    #[serde(flatten)]
    pub plan: Plan,
    pub audit_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reoptimize_error: Option<String>,
}

pub async fn edit_row(
    State(state): State<AppState>,
    Path((date, row_id)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<Json<EditedPlan>> {
    let date = parse_date(&date)?;
    let row_id: u32 = row_id
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid row id: {row_id}"), None))?;
    let params: EditRow = parse_body(&body)?;

    let (plan, entry) = state.planner().edit_plan_row(date, row_id, &params).await?;

    let mut edited = EditedPlan {
        plan,
        audit_id: entry.id,
        job_id: None,
        reoptimize_error: None,
    };
    if params.reoptimize {
        let resubmit = SubmitOptimization {
            quick: true,
            date: Some(date),
            ..Default::default()
        };
        match state.dispatcher.submit(resubmit).await {
            Ok(job) => edited.job_id = Some(job.id),
            Err(e) => {
                log::warn!("edit {} kept but re-optimization failed: {e}", entry.id);
                edited.reoptimize_error = Some(e.to_string());
            }
        }
    }
    Ok(Json(edited))
}

pub async fn lock_plan(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> ApiResult<Json<LockOutcome>> {
    let date = parse_date(&date)?;
    Ok(Json(state.planner().lock_plan(date).await?))
}

async fn export(state: &AppState, date: &str, format: ExportFormat) -> ApiResult<impl IntoResponse> {
    let date = parse_date(date)?;
    let bytes = state.planner().export_plan(date, format).await?;
    let headers = [
        (header::CONTENT_TYPE, format.content_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", format.file_name(date)),
        ),
    ];
    Ok((headers, bytes))
}

pub async fn export_csv(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> ApiResult<impl IntoResponse> {
    export(&state, &date, ExportFormat::Csv).await
}

pub async fn export_pdf(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> ApiResult<impl IntoResponse> {
    export(&state, &date, ExportFormat::Pdf).await
}

pub async fn simulate(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<SimulatedPlan>> {
    let params: Simulate = parse_body(&body)?;
    Ok(Json(state.planner().simulate(&params).await?))
}

pub async fn append_audit(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<AuditEntry>)> {
    let params: AppendAudit = parse_body(&body)?;
    let entry = state.planner().append_audit(&params).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn list_audit(State(state): State<AppState>) -> ApiResult<Json<Vec<AuditEntry>>> {
    Ok(Json(state.planner().list_audit().await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct KpisQuery {
    date: Option<String>,
}

pub async fn kpis(
    State(state): State<AppState>,
    query: QueryParams<KpisQuery>,
) -> ApiResult<Json<Kpis>> {
    let Query(query) = query?;
    let date = match query.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => today(),
    };
    Ok(Json(state.planner().kpis(date).await?))
}
