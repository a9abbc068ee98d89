use serde::Deserialize;

/// SQLite database configuration.
///
/// This section is loaded from `[database]` in `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "DatabaseConfig::default_path")]
    pub path: String,
    #[serde(default = "DatabaseConfig::default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseConfig {
    fn default_path() -> String {
        "edgemon.db".to_string()
    }

    fn default_max_connections() -> u32 {
        5
    }

    /// Returns a SQLite connection string, creating the file on first use.
    pub fn to_url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.path)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
            max_connections: Self::default_max_connections(),
        }
    }
}
