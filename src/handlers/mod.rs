pub mod commands;
pub mod devices;
pub mod status;
pub mod telemetry;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

pub(crate) const DEFAULT_LIST_LIMIT: i64 = 100;

/// Query string for list endpoints. `limit` is kept as a raw string so a
/// non-integer value can be answered with a 400 instead of being clamped
/// or silently defaulted.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<String>,
}

pub(crate) fn parse_limit(query: &ListQuery) -> Result<i64, Response> {
    match &query.limit {
        None => Ok(DEFAULT_LIST_LIMIT),
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|_| bad_request("invalid limit parameter")),
    }
}

pub(crate) fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

pub(crate) fn not_found(message: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
}

/// Storage failures are this tier's fault, not the client's: log and 500,
/// never retry. The caller resubmits if it cares.
pub(crate) fn storage_error(err: anyhow::Error) -> Response {
    error!("storage failure: {err:?}");
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}
