mod database;
mod forward;
mod liveness;
mod screenshots;
mod server;

pub use database::*;
pub use forward::*;
pub use liveness::*;
pub use screenshots::*;
pub use server::*;

use anyhow::{Context, Result};
use config::Config;
use serde::Deserialize;
use std::env;
use tracing::debug;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EdgemonConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub liveness: LivenessConfig,
    #[serde(default)]
    pub forward: ForwardConfig,
    #[serde(default)]
    pub screenshots: ScreenshotConfig,
}

impl EdgemonConfig {
    /// Loads configuration from the TOML file named by `EDGEMON_CONFIG`
    /// (optional) layered with `EDGEMON__*` environment variables.
    pub fn load() -> Result<Self> {
        let config_path =
            env::var("EDGEMON_CONFIG").unwrap_or_else(|_| "/etc/edgemon/config.toml".to_string());

        debug!("EDGEMON_CONFIG => {}", config_path);

        let settings = Config::builder()
            .add_source(config::File::with_name(&config_path).required(false))
            .add_source(config::Environment::with_prefix("EDGEMON").separator("__"))
            .build()
            .context("loading configuration")?;

        settings
            .try_deserialize::<Self>()
            .context("parsing configuration")
    }
}
