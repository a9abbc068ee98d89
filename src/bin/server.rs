use edgemon::db;
use edgemon::models::config::EdgemonConfig;
use edgemon::server::{AppState, app};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env()) // uses RUST_LOG
        .init();

    let cfg = EdgemonConfig::load()?;

    let pool = db::connect(&cfg.database).await?;
    db::run_migrations(&pool).await?;

    if let Some(target) = &cfg.forward.target_url {
        info!("forwarding accepted commands to {target}");
    }

    let state = AppState::new(pool, &cfg)?;
    let addr = cfg.server.bind_address();
    info!("Starting edgemon server on {addr}");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
