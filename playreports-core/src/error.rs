//! Core error types for `PlayReports`.

use thiserror::Error;

/// Error type shared by every stage of a report run.
///
/// Each variant is fatal for the operation that raised it. Nothing in the
/// workspace retries; the only place failures are absorbed is the credential
/// resolver's best-effort resource loading.
#[derive(Debug, Error)]
pub enum ReportsError {
    /// No credential source could be resolved, or a required option is missing.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Credential material is malformed or unusable.
    #[error("Credential error: {0}")]
    Credential(String),

    /// Token persistence failed.
    #[error("Token store error: {0}")]
    Store(String),

    /// A mandatory report object is absent for the requested period.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An archive did not contain exactly one entry.
    #[error("Format error: {0}")]
    Format(String),

    /// Transport construction or a network call failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// An operation was called out of order.
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// Local filesystem error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReportsError {
    /// Short machine-friendly name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Credential(_) => "credential",
            Self::Store(_) => "store",
            Self::NotFound(_) => "not_found",
            Self::Format(_) => "format",
            Self::Transport(_) => "transport",
            Self::IllegalState(_) => "illegal_state",
            Self::Io(_) => "io",
        }
    }

    /// Wraps a lower-level error as a transport failure with context.
    pub fn transport(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Transport(format!("{context}: {err}"))
    }
}
