//! Token store backed by the system keychain.
//!
//! This module provides a [`TokenStore`] on top of the system's secure
//! credential storage:
//! - macOS: Keychain Services
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring, KDE Wallet)
//!
//! The keychain cannot enumerate entries, so a whole namespace is kept as
//! one JSON document in a single entry (service `playreports:<namespace>`,
//! account `tokens`).

use std::collections::BTreeSet;

use async_trait::async_trait;
use keyring::Entry;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::token_store::{TokenDocument, TokenStore};

/// Service name prefix for `PlayReports` credentials.
const SERVICE_PREFIX: &str = "playreports";

/// Account name holding the namespace document.
const ACCOUNT: &str = "tokens";

/// Token store kept in the system keychain.
#[derive(Debug, Clone)]
pub struct KeychainTokenStore {
    namespace: String,
}

impl KeychainTokenStore {
    /// Creates a store for `namespace`.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Builds the full service name with prefix.
    fn service(&self) -> String {
        format!("{SERVICE_PREFIX}:{}", self.namespace)
    }

    fn entry(&self) -> Result<Entry, StoreError> {
        Entry::new(&self.service(), ACCOUNT).map_err(StoreError::from)
    }

    fn read(&self) -> Result<TokenDocument, StoreError> {
        match self.entry()?.get_password() {
            Ok(secret) if secret.is_empty() => Ok(TokenDocument::new(&self.namespace)),
            Ok(secret) => Ok(serde_json::from_str(&secret)?),
            Err(keyring::Error::NoEntry) => Ok(TokenDocument::new(&self.namespace)),
            Err(e) => {
                warn!(service = %self.service(), error = %e, "Failed to read keychain entry");
                Err(e.into())
            }
        }
    }

    fn write(&self, doc: &TokenDocument) -> Result<(), StoreError> {
        let secret = serde_json::to_string(doc)?;
        self.entry()?.set_password(&secret).map_err(|e| {
            warn!(service = %self.service(), error = %e, "Failed to write keychain entry");
            StoreError::from(e)
        })?;
        debug!(service = %self.service(), "Keychain entry updated");
        Ok(())
    }
}

#[async_trait]
impl TokenStore for KeychainTokenStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.read()?.get(key)
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let mut doc = self.read()?;
        doc.set(key, value);
        self.write(&doc)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut doc = self.read()?;
        if doc.delete(key) {
            self.write(&doc)?;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match self.entry()?.delete_credential() {
            Ok(()) => {
                debug!(service = %self.service(), "Keychain entry deleted");
                Ok(())
            }
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn keys(&self) -> Result<BTreeSet<String>, StoreError> {
        Ok(self.read()?.keys())
    }

    async fn values(&self) -> Result<Vec<Vec<u8>>, StoreError> {
        self.read()?.values()
    }
}

// ============================================================================
// Tests
// ============================================================================
