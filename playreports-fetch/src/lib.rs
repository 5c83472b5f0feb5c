// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `PlayReports` Fetch
//!
//! Credential resolution, authorization, and report retrieval.
//!
//! ## Host APIs
//!
//! The [`host`] module provides abstractions for system interactions:
//!
//! - [`host::http`] - HTTP client with tracing and domain allowlist
//! - [`host::transport`] - lazily built, process-wide transport
//! - [`host::identity`] - OAuth2 flows behind the [`IdentityProvider`] trait
//! - [`host::storage`] - bucket access behind the [`ObjectStore`] trait
//! - [`host::resources`] - bundled default credentials
//!
//! ## Report Pipeline
//!
//! - [`resolver::CredentialResolver`] - picks the credential material
//! - [`auth::Authenticator`] - turns material into an authorization
//! - [`reports::ReportFetcher`] - downloads earnings and sales reports
//! - [`unpack::Unpacker`] - extracts the single CSV of each archive
//! - [`export`] - copies reports out under collision-free names
//! - [`context::RunContext`] - runs all of the above once
//!
//! ## Example
//!
//! ```ignore
//! use playreports_fetch::{RunContext, RunOptions};
//!
//! let ctx = RunContext::builder()
//!     .identity(identity)
//!     .tokens(config.open_token_store())
//!     .connector(connector)
//!     .build()?;
//!
//! let outcome = ctx.run(&RunOptions::new("pubsite_prod_rev_0123", month)).await?;
//! for file in outcome.reports.earnings() {
//!     println!("{}", file.path().display());
//! }
//! ```

// Core modules
pub mod auth;
pub mod context;
pub mod error;
pub mod export;
pub mod host;
pub mod reports;
pub mod resolver;
pub mod unpack;

// Re-export key types at crate root

// Errors
pub use error::HttpError;

// Host APIs
pub use host::{
    http::{HttpClient, TransportConfig},
    identity::{ClientSecret, IdentityProvider, ServiceAccountKey, StoredToken},
    resources::{DirResources, ResourceLoader, StaticResources},
    storage::{ObjectRef, ObjectStore, StorageConnector},
    transport::SharedTransport,
};

// Pipeline
pub use auth::{Authenticator, USER_TOKEN_KEY};
pub use context::{RunContext, RunContextBuilder, RunOptions, RunOutcome};
pub use export::{export, resolve_collisions};
pub use reports::ReportFetcher;
pub use resolver::{CredentialResolver, CredentialSources};
pub use unpack::Unpacker;
