use serde::Deserialize;
use std::time::Duration;

/// How long a device may stay silent before the list path marks it offline.
///
/// This section is loaded from `[liveness]` in `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct LivenessConfig {
    #[serde(with = "humantime_serde", default = "LivenessConfig::default_window")]
    pub window: Duration,
}

impl LivenessConfig {
    fn default_window() -> Duration {
        Duration::from_secs(5 * 60)
    }
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            window: Self::default_window(),
        }
    }
}
