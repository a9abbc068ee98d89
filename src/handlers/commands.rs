use crate::handlers::{bad_request, not_found, storage_error};
use crate::models::commands::{CreateCommand, UpdateCommandStatus};
use crate::queries::commands::{
    get_command, insert_command, pending_commands, update_command_status,
};
use crate::server::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};

/// Handles `POST /devices/:id/commands`. The row is persisted before the
/// response goes out; forwarding to the edge tier is fired off afterwards
/// and can neither delay nor change the answer the operator already got.
pub async fn create(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    body: Bytes,
) -> Response {
    let payload = match serde_json::from_slice::<CreateCommand>(&body) {
        Ok(payload) => payload,
        Err(e) => {
            debug!("rejecting command for {device_id}: {e}");
            return bad_request("malformed command payload");
        }
    };

    if payload.command.trim().is_empty() {
        return bad_request("command text is required");
    }

    match insert_command(state.pool(), &device_id, &payload.command, Utc::now()).await {
        Ok(command) => {
            info!("📨 command {} queued for device {}", command.id, device_id);
            if let Some(forwarder) = state.forwarder() {
                forwarder.spawn_forward(command.clone());
            }
            Json(command).into_response()
        }
        Err(e) => storage_error(e),
    }
}

/// Handles `GET /devices/:id/commands/pending`. Agents poll this; an empty
/// queue is `[]`, never null.
pub async fn pending(State(state): State<AppState>, Path(device_id): Path<String>) -> Response {
    match pending_commands(state.pool(), &device_id).await {
        Ok(commands) => Json(commands).into_response(),
        Err(e) => storage_error(e),
    }
}

/// Handles `PUT /commands/:id/status`. Unknown ids get a 404 and terminal
/// or backward transitions a 409; the state machine only moves forward.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let payload = match serde_json::from_slice::<UpdateCommandStatus>(&body) {
        Ok(payload) => payload,
        Err(e) => {
            debug!("rejecting status update for command {id}: {e}");
            return bad_request("malformed status payload");
        }
    };

    // The update only matches rows where the transition is legal, so the
    // write is the check. A zero-row result is disambiguated afterwards:
    // missing id vs. a transition the guard refused.
    match update_command_status(state.pool(), &id, &payload, Utc::now()).await {
        Ok(Some(command)) => Json(command).into_response(),
        Ok(None) => match get_command(state.pool(), &id).await {
            Ok(Some(existing)) => (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": format!(
                        "cannot move command from {} to {}",
                        existing.status.as_str(),
                        payload.status.as_str()
                    )
                })),
            )
                .into_response(),
            Ok(None) => not_found("unknown command id"),
            Err(e) => storage_error(e),
        },
        Err(e) => storage_error(e),
    }
}
