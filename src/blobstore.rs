use crate::models::config::ScreenshotConfig;
use anyhow::{Result, bail};

/// Access to the external screenshot blob store, consumed only through its
/// two-call surface: presigned URL generation and a health probe. The
/// actual object storage is somebody else's problem.
#[derive(Debug, Clone)]
pub enum BlobStore {
    /// No store configured; URLs come back empty.
    Disabled,
    /// Store fronted by a public base URL; keys resolve beneath it.
    Fronted { base_url: String },
}

impl BlobStore {
    pub fn from_config(cfg: &ScreenshotConfig) -> Self {
        match &cfg.public_base_url {
            Some(base) => BlobStore::Fronted {
                base_url: base.trim_end_matches('/').to_string(),
            },
            None => BlobStore::Disabled,
        }
    }

    /// Returns a fetchable URL for `key`, or an empty string when the store
    /// is unavailable.
    pub fn presigned_url(&self, key: &str) -> String {
        match self {
            BlobStore::Disabled => String::new(),
            BlobStore::Fronted { base_url } => format!("{base_url}/{key}"),
        }
    }

    pub fn health_check(&self) -> Result<()> {
        match self {
            BlobStore::Disabled => bail!("screenshot store not configured"),
            BlobStore::Fronted { .. } => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_store_yields_empty_urls() {
        let store = BlobStore::from_config(&ScreenshotConfig::default());
        assert_eq!(store.presigned_url("shots/dev-1/1.png"), "");
        assert!(store.health_check().is_err());
    }

    #[test]
    fn fronted_store_joins_key_to_base() {
        let cfg = ScreenshotConfig {
            public_base_url: Some("https://blobs.example.com/shots/".to_string()),
        };
        let store = BlobStore::from_config(&cfg);
        assert_eq!(
            store.presigned_url("dev-1/1.png"),
            "https://blobs.example.com/shots/dev-1/1.png"
        );
        assert!(store.health_check().is_ok());
    }
}
