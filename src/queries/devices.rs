use crate::models::devices::{Device, RegisterDevice};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::time::Duration;
use tracing::debug;

/// Inserts the device or refreshes an existing row. Registration always
/// counts as a heartbeat: `last_seen` and `is_online` are set
/// unconditionally.
pub async fn upsert_device(
    pool: &SqlitePool,
    reg: &RegisterDevice,
    now: DateTime<Utc>,
) -> Result<Device> {
    let device = sqlx::query_as::<_, Device>(
        r#"
        INSERT INTO devices (id, name, device_type, os, ip, mac, location, current_user, last_seen, is_online)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            device_type = excluded.device_type,
            os = excluded.os,
            ip = excluded.ip,
            mac = excluded.mac,
            location = excluded.location,
            current_user = excluded.current_user,
            last_seen = excluded.last_seen,
            is_online = TRUE
        RETURNING id, name, device_type, os, ip, mac, location, current_user, last_seen, is_online
        "#,
    )
    .bind(&reg.id)
    .bind(&reg.name)
    .bind(&reg.device_type)
    .bind(&reg.os)
    .bind(&reg.ip)
    .bind(&reg.mac)
    .bind(&reg.location)
    .bind(&reg.current_user)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(device)
}

/// Bulk correction of the cached `is_online` flag: every device whose last
/// heartbeat predates `now - window` is marked offline. Invoked from the
/// list-devices path only, so a device that stops reporting is corrected
/// the next time somebody looks.
pub async fn reconcile_liveness(
    pool: &SqlitePool,
    now: DateTime<Utc>,
    window: Duration,
) -> Result<u64> {
    let cutoff = now - window;
    let flipped = sqlx::query("UPDATE devices SET is_online = FALSE WHERE is_online AND last_seen < $1")
        .bind(cutoff)
        .execute(pool)
        .await?
        .rows_affected();

    if flipped > 0 {
        debug!("marked {} device(s) offline", flipped);
    }
    Ok(flipped)
}

pub async fn list_devices(pool: &SqlitePool) -> Result<Vec<Device>> {
    let devices = sqlx::query_as::<_, Device>(
        "SELECT id, name, device_type, os, ip, mac, location, current_user, last_seen, is_online
         FROM devices ORDER BY last_seen DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(devices)
}

pub async fn get_device(pool: &SqlitePool, id: &str) -> Result<Option<Device>> {
    let device = sqlx::query_as::<_, Device>(
        "SELECT id, name, device_type, os, ip, mac, location, current_user, last_seen, is_online
         FROM devices WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(device)
}
