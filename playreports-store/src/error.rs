//! Store error types.

use playreports_core::ReportsError;
use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// System keychain error.
    #[error("Keychain error: {0}")]
    Keychain(String),

    /// A stored value could not be decoded.
    #[error("Corrupt token record for key '{key}': {reason}")]
    Corrupt {
        /// Key of the broken record.
        key: String,
        /// Decoder message.
        reason: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<keyring::Error> for StoreError {
    fn from(err: keyring::Error) -> Self {
        StoreError::Keychain(err.to_string())
    }
}

impl From<StoreError> for ReportsError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Config(msg) => ReportsError::Configuration(msg),
            other => ReportsError::Store(other.to_string()),
        }
    }
}
