// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `PlayReports` Store
//!
//! Durable state for the `PlayReports` workspace.
//!
//! This crate provides:
//!
//! - **TokenStore**: namespaced key-value storage for OAuth tokens, with
//!   file, keychain, and in-memory backends
//! - **Config**: the JSON configuration file
//! - **Persistence**: file I/O helpers for JSON data
//!
//! ## Usage
//!
//! ```ignore
//! use playreports_store::{Config, TokenStore};
//!
//! let config = Config::load()?;
//! let tokens = config.open_token_store();
//!
//! if config.force_reauthorization {
//!     tokens.logout().await?;
//! }
//! ```

pub mod config;
pub mod error;
pub mod keychain;
pub mod persistence;
pub mod token_store;

pub use config::{Config, DEFAULT_BUCKET, DEFAULT_NAMESPACE, TokenBackend};
pub use error::StoreError;
pub use keychain::KeychainTokenStore;
pub use persistence::{
    default_config_dir, default_config_path, default_resources_dir, default_tokens_dir,
    ensure_dir, load_json, load_json_if_exists, save_json,
};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
