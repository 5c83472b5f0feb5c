//! Durable, namespaced token storage.
//!
//! A token store maps string keys to opaque byte values under a namespace
//! supplied by the caller. The authenticator keeps the interactive user's
//! OAuth token in it so later runs can skip the consent prompt.
//!
//! ## Backends
//!
//! 1. **File** - one JSON document per namespace under the config dir
//! 2. **Keychain** - the same document in one system keychain entry
//!    (see [`crate::keychain`])
//! 3. **Memory** - process-local, for tests
//!
//! Stores do not lock across processes. Two writers to the same key race
//! and the last write wins.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, instrument};

use crate::error::StoreError;
use crate::persistence::{default_tokens_dir, load_json_if_exists, remove_if_exists, save_json};

// ============================================================================
// Token Store Trait
// ============================================================================

/// Namespaced key-value storage for serialized credentials.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Namespace every key of this store lives under.
    fn namespace(&self) -> &str;

    /// Returns the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Stores `value` under `key`.
    ///
    /// Fails fast. On error the previous value of `key` is unspecified.
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Removes every key in the namespace.
    async fn clear(&self) -> Result<(), StoreError>;

    /// All keys in the namespace.
    async fn keys(&self) -> Result<BTreeSet<String>, StoreError>;

    /// All values in the namespace, in key order.
    async fn values(&self) -> Result<Vec<Vec<u8>>, StoreError>;

    /// Forgets every stored authorization.
    async fn logout(&self) -> Result<(), StoreError> {
        debug!(namespace = %self.namespace(), "Logging out");
        self.clear().await
    }
}

// ============================================================================
// Token Document
// ============================================================================

/// On-disk form of one namespace. Values are base64 encoded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct TokenDocument {
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub entries: BTreeMap<String, String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TokenDocument {
    pub(crate) fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            ..Self::default()
        }
    }

    pub(crate) fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.entries
            .get(key)
            .map(|encoded| decode_value(key, encoded))
            .transpose()
    }

    pub(crate) fn set(&mut self, key: &str, value: &[u8]) {
        self.entries.insert(key.to_string(), STANDARD.encode(value));
        self.updated_at = Some(Utc::now());
    }

    pub(crate) fn delete(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.updated_at = Some(Utc::now());
        }
        removed
    }

    pub(crate) fn keys(&self) -> BTreeSet<String> {
        self.entries.keys().cloned().collect()
    }

    pub(crate) fn values(&self) -> Result<Vec<Vec<u8>>, StoreError> {
        self.entries
            .iter()
            .map(|(key, encoded)| decode_value(key, encoded))
            .collect()
    }
}

fn decode_value(key: &str, encoded: &str) -> Result<Vec<u8>, StoreError> {
    STANDARD.decode(encoded).map_err(|e| StoreError::Corrupt {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// Makes a namespace safe to use as a file name.
pub(crate) fn sanitize_namespace(namespace: &str) -> String {
    let cleaned: String = namespace
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "default".to_string()
    } else {
        cleaned
    }
}

// ============================================================================
// File Token Store
// ============================================================================

/// Token store persisted as `<dir>/<namespace>.json`.
#[derive(Debug)]
pub struct FileTokenStore {
    namespace: String,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileTokenStore {
    /// Creates a store under the default tokens directory.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self::in_dir(default_tokens_dir(), namespace)
    }

    /// Creates a store under a specific directory.
    pub fn in_dir(dir: impl Into<PathBuf>, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let path = dir
            .into()
            .join(format!("{}.json", sanitize_namespace(&namespace)));
        Self {
            namespace,
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<TokenDocument, StoreError> {
        Ok(load_json_if_exists(&self.path)
            .await?
            .unwrap_or_else(|| TokenDocument::new(&self.namespace)))
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    #[instrument(skip(self), fields(namespace = %self.namespace))]
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.read().await?.get(key)
    }

    #[instrument(skip(self, value), fields(namespace = %self.namespace))]
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.read().await?;
        doc.set(key, value);
        save_json(&self.path, &doc).await?;
        debug!(path = %self.path.display(), "Token record stored");
        Ok(())
    }

    #[instrument(skip(self), fields(namespace = %self.namespace))]
    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.read().await?;
        if doc.delete(key) {
            save_json(&self.path, &doc).await?;
            debug!(path = %self.path.display(), "Token record deleted");
        }
        Ok(())
    }

    #[instrument(skip(self), fields(namespace = %self.namespace))]
    async fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        remove_if_exists(&self.path).await
    }

    async fn keys(&self) -> Result<BTreeSet<String>, StoreError> {
        Ok(self.read().await?.keys())
    }

    async fn values(&self) -> Result<Vec<Vec<u8>>, StoreError> {
        self.read().await?.values()
    }
}

// ============================================================================
// Memory Token Store
// ============================================================================

/// Process-local token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    namespace: String,
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            entries: RwLock::new(BTreeMap::new()),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.entries.write().await.clear();
        Ok(())
    }

    async fn keys(&self) -> Result<BTreeSet<String>, StoreError> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }

    async fn values(&self) -> Result<Vec<Vec<u8>>, StoreError> {
        Ok(self.entries.read().await.values().cloned().collect())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_namespace() {
        assert_eq!(sanitize_namespace("playreports"), "playreports");
        assert_eq!(sanitize_namespace("com/bytes tool"), "com_bytes_tool");
        assert_eq!(sanitize_namespace(".."), "default");
        assert_eq!(sanitize_namespace(""), "default");
    }

    #[test]
    fn test_document_rejects_bad_base64() {
        let mut doc = TokenDocument::new("ns");
        doc.entries.insert("user".into(), "***".into());
        assert!(matches!(doc.get("user"), Err(StoreError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::in_dir(dir.path(), "playreports");

        assert!(store.get("user").await.unwrap().is_none());
        store.set("user", b"token-bytes").await.unwrap();
        assert_eq!(store.get("user").await.unwrap().unwrap(), b"token-bytes");
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        FileTokenStore::in_dir(dir.path(), "ns")
            .set("user", b"v1")
            .await
            .unwrap();

        let reopened = FileTokenStore::in_dir(dir.path(), "ns");
        assert_eq!(reopened.get("user").await.unwrap().unwrap(), b"v1");

        let other = FileTokenStore::in_dir(dir.path(), "other");
        assert!(other.get("user").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_keys_values_delete_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::in_dir(dir.path(), "ns");
        store.set("b", b"2").await.unwrap();
        store.set("a", b"1").await.unwrap();

        let keys: Vec<_> = store.keys().await.unwrap().into_iter().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(store.values().await.unwrap(), vec![b"1".to_vec(), b"2".to_vec()]);

        store.delete("a").await.unwrap();
        store.delete("missing").await.unwrap();
        assert_eq!(store.keys().await.unwrap().len(), 1);

        store.logout().await.unwrap();
        assert!(store.keys().await.unwrap().is_empty());
        assert!(!store.path().exists());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let first = FileTokenStore::in_dir(dir.path(), "ns");
        let second = FileTokenStore::in_dir(dir.path(), "ns");

        first.set("user", b"first").await.unwrap();
        second.set("user", b"second").await.unwrap();
        assert_eq!(first.get("user").await.unwrap().unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryTokenStore::new("ns");
        assert_eq!(store.namespace(), "ns");
        store.set("user", b"x").await.unwrap();
        assert_eq!(store.values().await.unwrap(), vec![b"x".to_vec()]);
        store.clear().await.unwrap();
        assert!(store.get("user").await.unwrap().is_none());
    }
}
