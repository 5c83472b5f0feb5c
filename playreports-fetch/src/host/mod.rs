//! Host APIs for `PlayReports`.
//!
//! This module provides abstractions for interacting with external systems:
//!
//! - [`http`] - HTTP client with tracing and domain allowlist
//! - [`transport`] - the lazily built, process-wide HTTP transport
//! - [`identity`] - OAuth2 flows (interactive consent, refresh, service account)
//! - [`storage`] - bucket listing and object download
//! - [`resources`] - bundled default credentials

pub mod http;
pub mod identity;
pub mod resources;
pub mod storage;
pub mod transport;

// Re-export key types
pub use http::{HttpClient, TransportConfig, ensure_success};
pub use identity::{ClientSecret, IdentityProvider, ServiceAccountKey, StoredToken};
pub use resources::{DirResources, ResourceLoader, StaticResources};
pub use storage::{ObjectRef, ObjectStore, StorageConnector};
pub use transport::SharedTransport;
