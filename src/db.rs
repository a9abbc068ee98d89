use crate::models::config::DatabaseConfig;
use anyhow::{Context, Result};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

pub async fn connect(cfg: &DatabaseConfig) -> Result<SqlitePool> {
    SqlitePoolOptions::new()
        .max_connections(cfg.max_connections)
        .connect(&cfg.to_url())
        .await
        .context("connecting to database")
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("running migrations")?;
    Ok(())
}

/// Fresh in-memory database per test. A single connection keeps the
/// `:memory:` database alive for the pool's whole lifetime.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite pool");
    run_migrations(&pool).await.expect("migrations");
    pool
}
