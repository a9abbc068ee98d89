use crate::models::telemetry::{
    DeviceActivity, DeviceAlert, DeviceMetric, DeviceProcess, NewDeviceActivity, NewDeviceAlert,
    NewDeviceMetric, NewDeviceProcess, Screenshot,
};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};

/// Every accepted telemetry write doubles as a heartbeat, committed in the
/// same transaction as the row itself so the agent never gets an error for
/// data that was in fact persisted.
async fn touch_in_tx(
    tx: &mut Transaction<'_, Sqlite>,
    device_id: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    sqlx::query("UPDATE devices SET last_seen = $1, is_online = TRUE WHERE id = $2")
        .bind(now)
        .bind(device_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub async fn insert_metric(
    pool: &SqlitePool,
    device_id: &str,
    metric: &NewDeviceMetric,
    now: DateTime<Utc>,
) -> Result<DeviceMetric> {
    let mut tx = pool.begin().await?;

    let stored = sqlx::query_as::<_, DeviceMetric>(
        r#"
        INSERT INTO device_metrics (device_id, cpu_usage, memory_usage, disk_usage, network_in, network_out, timestamp)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, device_id, cpu_usage, memory_usage, disk_usage, network_in, network_out, timestamp
        "#,
    )
    .bind(device_id)
    .bind(metric.cpu_usage)
    .bind(metric.memory_usage)
    .bind(metric.disk_usage)
    .bind(metric.network_in)
    .bind(metric.network_out)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    touch_in_tx(&mut tx, device_id, now).await?;
    tx.commit().await?;
    Ok(stored)
}

pub async fn list_metrics(
    pool: &SqlitePool,
    device_id: &str,
    limit: i64,
) -> Result<Vec<DeviceMetric>> {
    let rows = sqlx::query_as::<_, DeviceMetric>(
        "SELECT id, device_id, cpu_usage, memory_usage, disk_usage, network_in, network_out, timestamp
         FROM device_metrics WHERE device_id = $1 ORDER BY timestamp DESC LIMIT $2",
    )
    .bind(device_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn insert_activity(
    pool: &SqlitePool,
    device_id: &str,
    activity: &NewDeviceActivity,
    now: DateTime<Utc>,
) -> Result<DeviceActivity> {
    let mut tx = pool.begin().await?;

    let stored = sqlx::query_as::<_, DeviceActivity>(
        r#"
        INSERT INTO device_activities (device_id, activity_type, description, timestamp)
        VALUES ($1, $2, $3, $4)
        RETURNING id, device_id, activity_type, description, timestamp
        "#,
    )
    .bind(device_id)
    .bind(&activity.activity_type)
    .bind(&activity.description)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    touch_in_tx(&mut tx, device_id, now).await?;
    tx.commit().await?;
    Ok(stored)
}

pub async fn list_activities(
    pool: &SqlitePool,
    device_id: &str,
    limit: i64,
) -> Result<Vec<DeviceActivity>> {
    let rows = sqlx::query_as::<_, DeviceActivity>(
        "SELECT id, device_id, activity_type, description, timestamp
         FROM device_activities WHERE device_id = $1 ORDER BY timestamp DESC LIMIT $2",
    )
    .bind(device_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Replaces the full process snapshot for a device. Delete and re-insert
/// happen in one transaction so readers only ever see a complete snapshot,
/// never a mixture of two reports. An empty `processes` list is a valid
/// report meaning "nothing running".
pub async fn replace_processes(
    pool: &SqlitePool,
    device_id: &str,
    processes: &[NewDeviceProcess],
    now: DateTime<Utc>,
) -> Result<Vec<DeviceProcess>> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM device_processes WHERE device_id = $1")
        .bind(device_id)
        .execute(&mut *tx)
        .await?;

    let mut stored = Vec::with_capacity(processes.len());
    for process in processes {
        let row = sqlx::query_as::<_, DeviceProcess>(
            r#"
            INSERT INTO device_processes (device_id, pid, name, cpu_usage, memory_usage, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, device_id, pid, name, cpu_usage, memory_usage, timestamp
            "#,
        )
        .bind(device_id)
        .bind(process.pid)
        .bind(&process.name)
        .bind(process.cpu_usage)
        .bind(process.memory_usage)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;
        stored.push(row);
    }

    touch_in_tx(&mut tx, device_id, now).await?;
    tx.commit().await?;
    Ok(stored)
}

/// Snapshot rows share one timestamp, so ordering within it falls back to
/// CPU usage: the busiest processes surface first.
pub async fn list_processes(
    pool: &SqlitePool,
    device_id: &str,
    limit: i64,
) -> Result<Vec<DeviceProcess>> {
    let rows = sqlx::query_as::<_, DeviceProcess>(
        "SELECT id, device_id, pid, name, cpu_usage, memory_usage, timestamp
         FROM device_processes WHERE device_id = $1
         ORDER BY timestamp DESC, cpu_usage DESC LIMIT $2",
    )
    .bind(device_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn insert_alert(
    pool: &SqlitePool,
    device_id: &str,
    alert: &NewDeviceAlert,
    now: DateTime<Utc>,
) -> Result<DeviceAlert> {
    let mut tx = pool.begin().await?;

    let stored = sqlx::query_as::<_, DeviceAlert>(
        r#"
        INSERT INTO device_alerts (device_id, severity, message, timestamp)
        VALUES ($1, $2, $3, $4)
        RETURNING id, device_id, severity, message, timestamp
        "#,
    )
    .bind(device_id)
    .bind(alert.severity)
    .bind(&alert.message)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    touch_in_tx(&mut tx, device_id, now).await?;
    tx.commit().await?;
    Ok(stored)
}

pub async fn list_alerts(
    pool: &SqlitePool,
    device_id: &str,
    limit: i64,
) -> Result<Vec<DeviceAlert>> {
    let rows = sqlx::query_as::<_, DeviceAlert>(
        "SELECT id, device_id, severity, message, timestamp
         FROM device_alerts WHERE device_id = $1 ORDER BY timestamp DESC LIMIT $2",
    )
    .bind(device_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn list_screenshots(
    pool: &SqlitePool,
    device_id: &str,
    limit: i64,
) -> Result<Vec<Screenshot>> {
    let rows = sqlx::query_as::<_, Screenshot>(
        "SELECT id, device_id, object_key, timestamp
         FROM screenshots WHERE device_id = $1 ORDER BY timestamp DESC LIMIT $2",
    )
    .bind(device_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
