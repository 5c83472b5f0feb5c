//! Bundled credential resources.
//!
//! A build can ship default credentials alongside the binary. Lookups are
//! best effort: a resource that is missing or unreadable is simply absent.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::debug;

/// Bundled service account PKCS#12 key.
pub const SERVICE_KEY_RESOURCE: &str = "service_key.p12";

/// Bundled service account e-mail.
pub const SERVICE_EMAIL_RESOURCE: &str = "service_email";

/// Bundled OAuth2 client secret.
pub const CLIENT_SECRET_RESOURCE: &str = "client_secret.json";

/// Read-only lookup of named resources.
pub trait ResourceLoader: Send + Sync {
    /// Returns the resource bytes, or `None` if it is unavailable.
    fn load(&self, name: &str) -> Option<Vec<u8>>;
}

/// Resources stored as files in one directory.
#[derive(Debug, Clone)]
pub struct DirResources {
    dir: PathBuf,
}

impl DirResources {
    /// Resources under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ResourceLoader for DirResources {
    fn load(&self, name: &str) -> Option<Vec<u8>> {
        let path = self.dir.join(name);
        match std::fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Bundled resource unavailable");
                None
            }
        }
    }
}

/// Resources held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticResources {
    entries: HashMap<String, Vec<u8>>,
}

impl StaticResources {
    /// Empty resource set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.entries.insert(name.into(), bytes.into());
        self
    }
}

impl ResourceLoader for StaticResources {
    fn load(&self, name: &str) -> Option<Vec<u8>> {
        self.entries.get(name).cloned()
    }
}
