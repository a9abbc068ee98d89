use crate::handlers::{bad_request, storage_error};
use crate::models::devices::RegisterDevice;
use crate::queries::devices::{list_devices, reconcile_liveness, upsert_device};
use crate::server::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use tracing::{debug, info};

/// Handles `POST /devices`. Registration doubles as a heartbeat: the upsert
/// unconditionally refreshes `last_seen` and flips the device online.
pub async fn register(State(state): State<AppState>, body: Bytes) -> Response {
    let payload = match serde_json::from_slice::<RegisterDevice>(&body) {
        Ok(payload) => payload,
        Err(e) => {
            debug!("rejecting device registration: {e}");
            return bad_request("malformed device payload");
        }
    };

    if payload.id.trim().is_empty() {
        return bad_request("device id is required");
    }

    match upsert_device(state.pool(), &payload, Utc::now()).await {
        Ok(device) => {
            info!("📟 device {} registered", device.id);
            Json(device).into_response()
        }
        Err(e) => storage_error(e),
    }
}

/// Handles `GET /devices`. The liveness sweep runs here and only here; a
/// device nobody lists keeps its cached flag, by contract.
pub async fn list(State(state): State<AppState>) -> Response {
    let now = Utc::now();
    if let Err(e) = reconcile_liveness(state.pool(), now, state.liveness_window()).await {
        return storage_error(e);
    }

    match list_devices(state.pool()).await {
        Ok(devices) => Json(devices).into_response(),
        Err(e) => storage_error(e),
    }
}
