//! Credential source resolution.
//!
//! Picks the credential material for a run from, in order:
//!
//! 1. an explicitly configured service account key file and e-mail
//! 2. an explicitly configured OAuth2 client secret file
//! 3. the bundled service account key and e-mail
//! 4. the bundled client secret
//!
//! Service account material always wins over user material at the same
//! level. Loading is best effort: anything unreadable counts as absent.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use playreports_core::{CredentialMaterial, ReportsError};
use tracing::{debug, info, warn};

use crate::host::resources::{
    CLIENT_SECRET_RESOURCE, ResourceLoader, SERVICE_EMAIL_RESOURCE, SERVICE_KEY_RESOURCE,
};

/// Explicitly configured credential locations.
#[derive(Debug, Clone, Default)]
pub struct CredentialSources {
    /// Service account PKCS#12 key file.
    pub service_key_path: Option<PathBuf>,
    /// Service account e-mail.
    pub service_account_email: Option<String>,
    /// OAuth2 client secret file.
    pub client_secret_path: Option<PathBuf>,
}

/// Resolves which credential material a run uses.
#[derive(Clone)]
pub struct CredentialResolver {
    explicit: CredentialSources,
    bundled: Arc<dyn ResourceLoader>,
}

impl CredentialResolver {
    /// Creates a resolver over explicit sources and bundled defaults.
    pub fn new(explicit: CredentialSources, bundled: Arc<dyn ResourceLoader>) -> Self {
        Self { explicit, bundled }
    }

    /// Explicit sources in use.
    pub fn explicit(&self) -> &CredentialSources {
        &self.explicit
    }

    /// Returns the first available credential material.
    ///
    /// Performs no network I/O.
    pub fn resolve(&self) -> Result<CredentialMaterial, ReportsError> {
        if let Some(material) = self.explicit_service_account() {
            info!(mode = "service_account", source = "config", "Using credentials");
            return Ok(material);
        }

        if let Some(path) = &self.explicit.client_secret_path {
            if let Some(bytes) = read_file(path) {
                info!(mode = "user", source = "config", "Using credentials");
                return Ok(CredentialMaterial::UserSecret {
                    secret_json_bytes: bytes,
                });
            }
        }

        if let Some(material) = self.bundled_service_account() {
            info!(mode = "service_account", source = "bundled", "Using credentials");
            return Ok(material);
        }

        if let Some(bytes) = self.bundled.load(CLIENT_SECRET_RESOURCE) {
            info!(mode = "user", source = "bundled", "Using credentials");
            return Ok(CredentialMaterial::UserSecret {
                secret_json_bytes: bytes,
            });
        }

        Err(ReportsError::Configuration(
            "neither user nor service credentials provided".to_string(),
        ))
    }

    fn explicit_service_account(&self) -> Option<CredentialMaterial> {
        let email = self
            .explicit
            .service_account_email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty());

        match (&self.explicit.service_key_path, email) {
            (Some(path), Some(email)) => read_file(path).map(|key_bytes| {
                CredentialMaterial::ServiceAccount {
                    key_bytes,
                    account_email: email.to_string(),
                }
            }),
            (Some(path), None) => {
                warn!(
                    path = %path.display(),
                    "service_key_path is set without service_account_email, ignoring"
                );
                None
            }
            (None, Some(email)) => {
                warn!(
                    email = %email,
                    "service_account_email is set without service_key_path, ignoring"
                );
                None
            }
            (None, None) => None,
        }
    }

    fn bundled_service_account(&self) -> Option<CredentialMaterial> {
        let key_bytes = self.bundled.load(SERVICE_KEY_RESOURCE)?;
        let raw_email = self.bundled.load(SERVICE_EMAIL_RESOURCE)?;

        let email = match String::from_utf8(raw_email) {
            Ok(email) => email.trim().to_string(),
            Err(e) => {
                debug!(error = %e, "Bundled service e-mail is not UTF-8");
                return None;
            }
        };
        if email.is_empty() {
            debug!("Bundled service e-mail is empty");
            return None;
        }

        Some(CredentialMaterial::ServiceAccount {
            key_bytes,
            account_email: email,
        })
    }
}

impl std::fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialResolver")
            .field("explicit", &self.explicit)
            .finish_non_exhaustive()
    }
}

fn read_file(path: &Path) -> Option<Vec<u8>> {
    match std::fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Credential file unavailable");
            None
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
