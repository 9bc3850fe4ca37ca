//! Content-type gate blocking CSRF "simple" requests.
//!
//! Browser forms can submit cross-origin without a preflight when the
//! content type is one of the form-submittable types, so those are rejected
//! outright on every route.
//! https://cheatsheetseries.owasp.org/cheatsheets/Cross-Site_Request_Forgery_Prevention_Cheat_Sheet.html#disallowing-simple-requests

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

const FORM_CONTENT_TYPES: [&str; 3] = [
    "application/x-www-form-urlencoded",
    "multipart/form-data",
    "text/plain",
];

pub async fn reject_form_content_types(request: Request<Body>, next: Next) -> Response {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    if let Some(content_type) = content_type {
        // Compare on the media-type essence; parameters such as charset
        // must not bypass the check.
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if FORM_CONTENT_TYPES.contains(&essence.as_str()) {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Content-Type not supported"})),
            )
                .into_response();
        }
    }

    next.run(request).await
}
