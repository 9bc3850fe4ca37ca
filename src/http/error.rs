//! API error responses.
//!
//! # Responsibilities
//! - Map the error taxonomy to HTTP status codes and JSON bodies
//! - Keep store detail out of client-visible responses
//!
//! # Design Decisions
//! - Validation responses carry every failing field with every message
//! - Store failures log the detail and return a generic 500

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::flags::store::StoreError;
use crate::flags::validator::ValidationErrors;
use crate::flags::UpsertError;

/// Client-facing request failures.
#[derive(Debug)]
pub enum ApiError {
    /// Target flag does not exist.
    NotFound,

    /// One or more validation rules failed.
    Validation(ValidationErrors),

    /// Backing store could not be reached or decoded.
    Store(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        Self::Store(error)
    }
}

impl From<UpsertError> for ApiError {
    fn from(error: UpsertError) -> Self {
        match error {
            UpsertError::Invalid(errors) => Self::Validation(errors),
            UpsertError::Store(error) => Self::Store(error),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({"error": "Not Found"})),
            )
                .into_response(),
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({"errors": errors})),
            )
                .into_response(),
            ApiError::Store(error) => {
                tracing::error!(%error, "store operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "Internal Server Error"})),
                )
                    .into_response()
            }
        }
    }
}
