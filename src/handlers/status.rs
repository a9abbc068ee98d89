use crate::server::AppState;
use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};
use sqlx::SqlitePool;

pub async fn status(State(state): State<AppState>) -> Json<Value> {
    let db_status = match sqlx::query("SELECT 1 as health_check")
        .fetch_one(state.pool())
        .await
    {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let blob_status = match state.blobs().health_check() {
        Ok(_) => "healthy",
        Err(_) => "unavailable",
    };

    let (total_devices, online_devices, pending_commands) = get_basic_stats(state.pool()).await;

    Json(json!({
        "service": "edgemon",
        "status": "running",
        "database": db_status,
        "screenshot_store": blob_status,
        "stats": {
            "total_devices": total_devices,
            "online_devices": online_devices,
            "pending_commands": pending_commands
        },
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn get_basic_stats(pool: &SqlitePool) -> (i64, i64, i64) {
    let devices = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM devices")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    let online = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM devices WHERE is_online")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    let pending = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM remote_commands WHERE status = 'pending'",
    )
    .fetch_one(pool)
    .await
    .unwrap_or(0);

    (devices, online, pending)
}
