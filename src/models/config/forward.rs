use serde::Deserialize;
use std::time::Duration;

/// Command forwarding to the edge tier.
///
/// This section is loaded from `[forward]` in `config.toml`. Forwarding is
/// disabled entirely when `target_url` is unset; commands are still
/// persisted and served to polling agents.
#[derive(Debug, Clone, Deserialize)]
pub struct ForwardConfig {
    /// Full URL the command JSON is POSTed to (e.g. "http://edge:9000/commands").
    pub target_url: Option<String>,

    /// Retries after the first attempt; total attempts = max_retries + 1.
    #[serde(default = "ForwardConfig::default_max_retries")]
    pub max_retries: u32,

    /// First backoff delay; doubled after each failed attempt.
    #[serde(with = "humantime_serde", default = "ForwardConfig::default_base_delay")]
    pub base_delay: Duration,

    /// Ceiling for the doubled backoff delay.
    #[serde(with = "humantime_serde", default = "ForwardConfig::default_max_delay")]
    pub max_delay: Duration,

    /// Per-attempt HTTP timeout.
    #[serde(
        with = "humantime_serde",
        default = "ForwardConfig::default_request_timeout"
    )]
    pub request_timeout: Duration,

    /// Maximum forward tasks in flight at once.
    #[serde(default = "ForwardConfig::default_concurrency")]
    pub concurrency: usize,
}

impl ForwardConfig {
    fn default_max_retries() -> u32 {
        3
    }

    fn default_base_delay() -> Duration {
        Duration::from_millis(500)
    }

    fn default_max_delay() -> Duration {
        Duration::from_secs(10)
    }

    fn default_request_timeout() -> Duration {
        Duration::from_secs(10)
    }

    fn default_concurrency() -> usize {
        8
    }
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            target_url: None,
            max_retries: Self::default_max_retries(),
            base_delay: Self::default_base_delay(),
            max_delay: Self::default_max_delay(),
            request_timeout: Self::default_request_timeout(),
            concurrency: Self::default_concurrency(),
        }
    }
}
