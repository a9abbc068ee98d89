use crate::models::commands::{RemoteCommand, UpdateCommandStatus};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

const COMMAND_COLUMNS: &str =
    "id, device_id, command, status, created_at, completed_at, result, exit_code";

pub async fn insert_command(
    pool: &SqlitePool,
    device_id: &str,
    command: &str,
    now: DateTime<Utc>,
) -> Result<RemoteCommand> {
    let stored = sqlx::query_as::<_, RemoteCommand>(
        r#"
        INSERT INTO remote_commands (id, device_id, command, status, created_at)
        VALUES ($1, $2, $3, 'pending', $4)
        RETURNING id, device_id, command, status, created_at, completed_at, result, exit_code
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(device_id)
    .bind(command)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(stored)
}

pub async fn get_command(pool: &SqlitePool, id: &str) -> Result<Option<RemoteCommand>> {
    let command = sqlx::query_as::<_, RemoteCommand>(&format!(
        "SELECT {COMMAND_COLUMNS} FROM remote_commands WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(command)
}

pub async fn pending_commands(pool: &SqlitePool, device_id: &str) -> Result<Vec<RemoteCommand>> {
    let commands = sqlx::query_as::<_, RemoteCommand>(&format!(
        "SELECT {COMMAND_COLUMNS} FROM remote_commands
         WHERE device_id = $1 AND status = 'pending' ORDER BY created_at"
    ))
    .bind(device_id)
    .fetch_all(pool)
    .await?;

    Ok(commands)
}

/// Applies a status update. `completed_at` is stamped exactly when the new
/// status is terminal; a move to `running` leaves it NULL. The transition
/// guard lives in the UPDATE itself so two racing writers cannot both read
/// "running" and then drag a finished command backward: terminal rows and
/// rank-lowering moves match zero rows and come back as `None`.
pub async fn update_command_status(
    pool: &SqlitePool,
    id: &str,
    update: &UpdateCommandStatus,
    now: DateTime<Utc>,
) -> Result<Option<RemoteCommand>> {
    let completed_at: Option<DateTime<Utc>> = update.status.is_terminal().then_some(now);

    let updated = sqlx::query_as::<_, RemoteCommand>(
        r#"
        UPDATE remote_commands
        SET status = $1, result = $2, exit_code = $3, completed_at = $4
        WHERE id = $5
          AND status NOT IN ('completed', 'failed')
          AND (CASE status WHEN 'pending' THEN 0 WHEN 'running' THEN 1 ELSE 2 END) <= $6
        RETURNING id, device_id, command, status, created_at, completed_at, result, exit_code
        "#,
    )
    .bind(update.status)
    .bind(&update.result)
    .bind(update.exit_code)
    .bind(completed_at)
    .bind(id)
    .bind(update.status.rank() as i64)
    .fetch_optional(pool)
    .await?;

    Ok(updated)
}
