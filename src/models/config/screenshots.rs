use serde::Deserialize;

/// Screenshot blob-store access.
///
/// This section is loaded from `[screenshots]` in `config.toml`. When
/// `public_base_url` is unset the store is considered unavailable and
/// listed screenshots carry an empty URL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScreenshotConfig {
    pub public_base_url: Option<String>,
}
