//! REST handlers for the flag API.
//!
//! # Responsibilities
//! - `GET /api/flags` — pattern/cursor listing
//! - `GET /api/flags/{key}` — single flag
//! - `PUT /api/flags` — validated upsert
//! - `DELETE /api/flags/{key}` — delete
//! - `GET /metrics` — Prometheus exposition

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::flags::store::DEFAULT_LIMIT;
use crate::flags::FlagCandidate;
use crate::http::error::ApiError;
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Glob pattern matched against flag keys.
    pub pattern: Option<String>,

    /// Exclusive cursor: only keys after this one.
    pub after: Option<String>,
}

pub async fn list_flags(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let flags = state
        .service
        .list(
            params.pattern.as_deref(),
            params.after.as_deref(),
            Some(DEFAULT_LIMIT),
        )
        .await?;
    Ok(Json(flags.iter().map(|flag| flag.to_value()).collect()))
}

pub async fn get_flag(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Value>, ApiError> {
    match state.service.get(&key).await? {
        Some(flag) => Ok(Json(flag.to_value())),
        None => Err(ApiError::NotFound),
    }
}

pub async fn upsert_flag(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(candidate): Json<FlagCandidate>,
) -> Result<Json<Value>, ApiError> {
    let flag = state.service.upsert(&headers, candidate).await?;
    Ok(Json(flag.to_value()))
}

pub async fn delete_flag(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.service.delete(&headers, &key).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

pub async fn metrics(State(state): State<AppState>) -> String {
    state.metrics.render()
}
