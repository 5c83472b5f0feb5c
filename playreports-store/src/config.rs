//! Configuration management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::keychain::KeychainTokenStore;
use crate::persistence::default_config_path;
use crate::token_store::{FileTokenStore, MemoryTokenStore, TokenStore};

/// Bucket baked in at build time via `PLAYREPORTS_DEFAULT_BUCKET`.
pub const DEFAULT_BUCKET: Option<&str> = option_env!("PLAYREPORTS_DEFAULT_BUCKET");

/// Default token store namespace.
pub const DEFAULT_NAMESPACE: &str = "playreports";

/// Where interactive tokens are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenBackend {
    /// JSON document under the config dir.
    #[default]
    File,
    /// System keychain.
    Keychain,
    /// Process memory only; every run prompts again.
    Memory,
}

impl TokenBackend {
    /// Opens a token store of this kind for `namespace`.
    pub fn open(self, namespace: &str) -> Arc<dyn TokenStore> {
        match self {
            Self::File => Arc::new(FileTokenStore::new(namespace)),
            Self::Keychain => Arc::new(KeychainTokenStore::new(namespace)),
            Self::Memory => Arc::new(MemoryTokenStore::new(namespace)),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bucket holding the report objects.
    pub bucket: Option<String>,
    /// Clear the token store before authorizing.
    pub force_reauthorization: bool,
    /// Explicit OAuth2 client secret file.
    pub client_secret_path: Option<PathBuf>,
    /// Explicit service account PKCS#12 key file.
    pub service_key_path: Option<PathBuf>,
    /// Service account e-mail; required together with `service_key_path`.
    pub service_account_email: Option<String>,
    /// Copy fetched reports out of the temp dir under their original names.
    pub keep_reports: bool,
    /// Destination for kept reports. Defaults to the working directory.
    pub output_dir: Option<PathBuf>,
    /// Token store backend.
    pub token_backend: TokenBackend,
    /// Token store namespace.
    pub namespace: String,
    /// Directory with bundled default credentials.
    pub resources_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bucket: None,
            force_reauthorization: false,
            client_secret_path: None,
            service_key_path: None,
            service_account_email: None,
            keep_reports: false,
            output_dir: None,
            token_backend: TokenBackend::default(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            resources_dir: None,
        }
    }
}

impl Config {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        default_config_path()
    }

    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, StoreError> {
        Self::load_from(&Self::default_path())
    }

    /// Loads configuration from a specific path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Returns the bucket to read from, falling back to the build-time default.
    pub fn resolve_bucket(&self) -> Result<String, StoreError> {
        self.resolve_bucket_with(DEFAULT_BUCKET)
    }

    fn resolve_bucket_with(&self, default: Option<&str>) -> Result<String, StoreError> {
        match (self.bucket.as_deref(), default) {
            (Some(bucket), _) if !bucket.trim().is_empty() => Ok(bucket.trim().to_string()),
            (_, Some(bucket)) if !bucket.is_empty() => Ok(bucket.to_string()),
            _ => Err(StoreError::Config(
                "reports bucket id missing and no build-time default bucket is set".to_string(),
            )),
        }
    }

    /// Logs options that are configured but cannot take effect.
    pub fn warn_inconsistencies(&self) {
        match (&self.service_key_path, &self.service_account_email) {
            (Some(path), None) => warn!(
                path = %path.display(),
                "service_key_path configured but service_account_email missing"
            ),
            (None, Some(email)) => warn!(
                email = %email,
                "service_account_email configured but service_key_path missing"
            ),
            _ => {}
        }
    }

    /// Opens the configured token store.
    pub fn open_token_store(&self) -> Arc<dyn TokenStore> {
        self.token_backend.open(&self.namespace)
    }
}
