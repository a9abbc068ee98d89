use crate::handlers::{ListQuery, bad_request, parse_limit, storage_error};
use crate::models::telemetry::{
    NewDeviceActivity, NewDeviceAlert, NewDeviceMetric, NewDeviceProcess, ScreenshotView,
};
use crate::queries::telemetry;
use crate::server::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use tracing::debug;

/// Handles `POST /devices/:id/metrics`. Timestamps are stamped server-side
/// at write time; anything the agent sends is ignored.
pub async fn record_metric(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    body: Bytes,
) -> Response {
    let payload = match serde_json::from_slice::<NewDeviceMetric>(&body) {
        Ok(payload) => payload,
        Err(e) => {
            debug!("rejecting metric for {device_id}: {e}");
            return bad_request("malformed metric payload");
        }
    };

    match telemetry::insert_metric(state.pool(), &device_id, &payload, Utc::now()).await {
        Ok(stored) => Json(stored).into_response(),
        Err(e) => storage_error(e),
    }
}

pub async fn metrics(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Response {
    let limit = match parse_limit(&query) {
        Ok(limit) => limit,
        Err(resp) => return resp,
    };

    match telemetry::list_metrics(state.pool(), &device_id, limit).await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => storage_error(e),
    }
}

pub async fn record_activity(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    body: Bytes,
) -> Response {
    let payload = match serde_json::from_slice::<NewDeviceActivity>(&body) {
        Ok(payload) => payload,
        Err(e) => {
            debug!("rejecting activity for {device_id}: {e}");
            return bad_request("malformed activity payload");
        }
    };

    match telemetry::insert_activity(state.pool(), &device_id, &payload, Utc::now()).await {
        Ok(stored) => Json(stored).into_response(),
        Err(e) => storage_error(e),
    }
}

pub async fn activities(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Response {
    let limit = match parse_limit(&query) {
        Ok(limit) => limit,
        Err(resp) => return resp,
    };

    match telemetry::list_activities(state.pool(), &device_id, limit).await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => storage_error(e),
    }
}

/// Handles `POST /devices/:id/processes`. The body is the complete current
/// process list; it replaces the previous snapshot wholesale. An empty
/// list is a legitimate "nothing running" report.
pub async fn report_processes(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    body: Bytes,
) -> Response {
    let payload = match serde_json::from_slice::<Vec<NewDeviceProcess>>(&body) {
        Ok(payload) => payload,
        Err(e) => {
            debug!("rejecting process report for {device_id}: {e}");
            return bad_request("malformed process list payload");
        }
    };

    match telemetry::replace_processes(state.pool(), &device_id, &payload, Utc::now()).await {
        Ok(stored) => Json(stored).into_response(),
        Err(e) => storage_error(e),
    }
}

pub async fn processes(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Response {
    let limit = match parse_limit(&query) {
        Ok(limit) => limit,
        Err(resp) => return resp,
    };

    match telemetry::list_processes(state.pool(), &device_id, limit).await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => storage_error(e),
    }
}

pub async fn record_alert(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    body: Bytes,
) -> Response {
    let payload = match serde_json::from_slice::<NewDeviceAlert>(&body) {
        Ok(payload) => payload,
        Err(e) => {
            debug!("rejecting alert for {device_id}: {e}");
            return bad_request("malformed alert payload");
        }
    };

    match telemetry::insert_alert(state.pool(), &device_id, &payload, Utc::now()).await {
        Ok(stored) => Json(stored).into_response(),
        Err(e) => storage_error(e),
    }
}

pub async fn alerts(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Response {
    let limit = match parse_limit(&query) {
        Ok(limit) => limit,
        Err(resp) => return resp,
    };

    match telemetry::list_alerts(state.pool(), &device_id, limit).await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => storage_error(e),
    }
}

/// Handles `GET /devices/:id/screenshots`. Each metadata row is decorated
/// with a presigned URL; an unconfigured store yields empty URLs rather
/// than an error.
pub async fn screenshots(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Response {
    let limit = match parse_limit(&query) {
        Ok(limit) => limit,
        Err(resp) => return resp,
    };

    match telemetry::list_screenshots(state.pool(), &device_id, limit).await {
        Ok(rows) => {
            let views: Vec<ScreenshotView> = rows
                .into_iter()
                .map(|screenshot| {
                    let url = state.blobs().presigned_url(&screenshot.object_key);
                    ScreenshotView { screenshot, url }
                })
                .collect();
            Json(views).into_response()
        }
        Err(e) => storage_error(e),
    }
}
