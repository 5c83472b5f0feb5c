//! Object storage abstraction.

use std::sync::Arc;

use async_trait::async_trait;
use playreports_core::{AuthorizationHandle, ReportsError};

use crate::host::http::HttpClient;

/// An object listed in a bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    /// Full object name, e.g. `earnings/earnings_202103_0123-1.zip`.
    pub name: String,
    /// Size in bytes, when the listing reports it.
    pub size: Option<u64>,
}

impl ObjectRef {
    /// Object with unknown size.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: None,
        }
    }

    /// The last segment of the object name.
    pub fn file_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

/// Read access to a bucket-based object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Lists every object in `bucket` whose name starts with `prefix`.
    ///
    /// Objects come back in lexicographic name order.
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectRef>, ReportsError>;

    /// Downloads the content of one object.
    async fn download(&self, bucket: &str, object_name: &str) -> Result<Vec<u8>, ReportsError>;
}

/// Creates an [`ObjectStore`] once the run is authorized.
pub trait StorageConnector: Send + Sync {
    /// Binds a store to the authorized transport.
    fn connect(&self, http: HttpClient, auth: AuthorizationHandle) -> Arc<dyn ObjectStore>;
}
