//! Routes relayed to the optimizer service.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, Method},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use rakeplan_core::upstream::{
    self, download_plan, fetch_resource, write_dataset, Acknowledgement, DatasetName, Envelope,
    Resource,
};
use serde_json::Value;

use super::{errors::ApiError, handlers::QueryParams, AppState};

type ProxyQuery = QueryParams<HashMap<String, String>>;

fn into_pairs(query: HashMap<String, String>) -> Vec<(String, String)> {
    let mut pairs: Vec<_> = query.into_iter().collect();
    pairs.sort();
    pairs
}

pub fn routes() -> Router<AppState> {
    let mut router = Router::new()
        .route(
            "/api/datasets/{name}",
            post(replace_dataset).put(replace_dataset),
        )
        .route("/api/download-plan", get(download));

    for resource in Resource::ALL {
        router = router.route(
            &format!("/api/{}", resource.path()),
            get(move |state: State<AppState>, query: ProxyQuery| read(state, query, resource)),
        );
    }
    router
}

async fn read(
    State(state): State<AppState>,
    query: ProxyQuery,
    resource: Resource,
) -> Result<Json<Envelope<Value>>, ApiError> {
    let Query(query) = query?;
    let data = fetch_resource(state.upstream.as_ref(), resource, into_pairs(query), None).await?;
    Ok(Json(Envelope::success(data)))
}

async fn replace_dataset(
    State(state): State<AppState>,
    method: Method,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<Acknowledgement>, ApiError> {
    let name: DatasetName = name.parse().map_err(ApiError::not_found)?;
    let body: Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request("Invalid JSON body", Some(e.to_string())))?;
    let method = if method == Method::PUT {
        upstream::Method::Put
    } else {
        upstream::Method::Post
    };

    let ack = write_dataset(state.upstream.as_ref(), name, method, body).await?;
    Ok(Json(ack))
}

async fn download(
    State(state): State<AppState>,
    query: ProxyQuery,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let download = download_plan(state.upstream.as_ref(), into_pairs(query)).await?;

    let mut headers = HeaderMap::new();
    let passed = [
        (header::CONTENT_TYPE, download.content_type),
        (header::CONTENT_DISPOSITION, download.content_disposition),
    ];
    for (name, value) in passed {
        if let Some(value) = value.and_then(|v| HeaderValue::from_str(&v).ok()) {
            headers.insert(name, value);
        }
    }
    Ok((headers, download.bytes))
}
