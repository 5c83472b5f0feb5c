//! Cloud Storage JSON API client.

use std::sync::Arc;

use async_trait::async_trait;
use playreports_core::{AuthorizationHandle, ReportsError};
use playreports_fetch::host::ensure_success;
use playreports_fetch::{HttpClient, HttpError, ObjectRef, ObjectStore, StorageConnector};
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use crate::error::GoogleError;

/// Public Cloud Storage endpoint.
pub const STORAGE_BASE_URL: &str = "https://storage.googleapis.com";

/// Fields requested from the list endpoint.
const LIST_FIELDS: &str = "items(name,size),nextPageToken";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    items: Vec<ListItem>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListItem {
    name: String,
    // The JSON API encodes uint64 values as strings.
    #[serde(default)]
    size: Option<String>,
}

// ============================================================================
// GCS Client
// ============================================================================

/// [`ObjectStore`] over the Cloud Storage JSON API v1.
#[derive(Debug, Clone)]
pub struct GcsClient {
    http: HttpClient,
    auth: AuthorizationHandle,
    base_url: String,
}

impl GcsClient {
    /// Client for the public endpoint.
    pub fn new(http: HttpClient, auth: AuthorizationHandle) -> Self {
        Self::with_base_url(http, auth, STORAGE_BASE_URL)
    }

    /// Client for a custom endpoint.
    pub fn with_base_url(http: HttpClient, auth: AuthorizationHandle, base_url: impl Into<String>) -> Self {
        Self {
            http,
            auth,
            base_url: base_url.into(),
        }
    }

    /// URL of one page of the object listing.
    pub fn list_url(&self, bucket: &str, prefix: &str, page_token: Option<&str>) -> Result<Url, GoogleError> {
        let mut url = self.object_url(bucket, None)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("prefix", prefix).append_pair("fields", LIST_FIELDS);
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }
        Ok(url)
    }

    /// URL of an object's content.
    pub fn media_url(&self, bucket: &str, object_name: &str) -> Result<Url, GoogleError> {
        let mut url = self.object_url(bucket, Some(object_name))?;
        url.query_pairs_mut().append_pair("alt", "media");
        Ok(url)
    }

    fn object_url(&self, bucket: &str, object_name: Option<&str>) -> Result<Url, GoogleError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| GoogleError::InvalidResponse(format!("invalid storage url: {e}")))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| GoogleError::InvalidResponse("storage url cannot be a base".to_string()))?;
            segments.pop_if_empty().extend(["storage", "v1", "b", bucket, "o"]);
            if let Some(name) = object_name {
                segments.push(name);
            }
        }
        Ok(url)
    }

    async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectRef>, GoogleError> {
        let mut objects = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let url = self.list_url(bucket, prefix, page_token.as_deref())?;
            let response = self
                .http
                .get_with_auth(url.as_str(), &self.auth.authorization_header())
                .await?;
            let page: ListResponse = ensure_success(response)
                .await?
                .json()
                .await
                .map_err(|e| GoogleError::InvalidResponse(format!("object listing: {}", HttpError::from(e))))?;

            objects.extend(page.items.into_iter().map(|item| ObjectRef {
                size: item.size.and_then(|s| s.parse().ok()),
                name: item.name,
            }));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(objects)
    }

    async fn download_object(&self, bucket: &str, object_name: &str) -> Result<Vec<u8>, GoogleError> {
        let url = self.media_url(bucket, object_name)?;
        let response = self
            .http
            .get_with_auth(url.as_str(), &self.auth.authorization_header())
            .await?;

        let response = match ensure_success(response).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => {
                return Err(GoogleError::ObjectNotFound(format!("{bucket}/{object_name}")));
            }
            Err(e) => return Err(e.into()),
        };

        let bytes = response.bytes().await.map_err(HttpError::from)?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ObjectStore for GcsClient {
    #[instrument(skip(self))]
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectRef>, ReportsError> {
        let objects = self.list_objects(bucket, prefix).await?;
        debug!(count = objects.len(), "Objects listed");
        Ok(objects)
    }

    #[instrument(skip(self))]
    async fn download(&self, bucket: &str, object_name: &str) -> Result<Vec<u8>, ReportsError> {
        Ok(self.download_object(bucket, object_name).await?)
    }
}

// ============================================================================
// Connector
// ============================================================================

/// Connects [`GcsClient`]s to an authorized transport.
#[derive(Debug, Clone)]
pub struct GcsConnector {
    base_url: String,
}

impl GcsConnector {
    /// Connector for the public endpoint.
    pub fn new() -> Self {
        Self::with_base_url(STORAGE_BASE_URL)
    }

    /// Connector for a custom endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for GcsConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageConnector for GcsConnector {
    fn connect(&self, http: HttpClient, auth: AuthorizationHandle) -> Arc<dyn ObjectStore> {
        Arc::new(GcsClient::with_base_url(http, auth, self.base_url.clone()))
    }
}
