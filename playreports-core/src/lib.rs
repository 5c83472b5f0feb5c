// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `PlayReports` Core
//!
//! Core types, models, and errors for the `PlayReports` workspace.
//!
//! This crate provides the foundational abstractions used across all other
//! `PlayReports` crates:
//!
//! - Domain models (credential material, authorization handles, report sets)
//! - The shared error taxonomy
//!
//! ## Key Types
//!
//! ### Credentials
//! - [`CredentialMaterial`] - Service-account key or user client secret
//! - [`CredentialMode`] - Which of the two modes is active
//! - [`AuthorizationHandle`] - Time-scoped access granted by the identity provider
//! - [`Scope`] - Named permission grant
//!
//! ### Reports
//! - [`ReportMonth`] - Calendar month a report set belongs to
//! - [`ReportKind`] - Earnings or sales
//! - [`ReportFile`] - One unpacked report in a temporary file
//! - [`ReportSet`] - Earnings and sales files for one run
//! - [`ExportMapping`] - Temp file to display name mapping used on export

pub mod error;
pub mod models;

pub use error::ReportsError;

pub use models::{
    // Credentials
    AuthorizationHandle,
    CredentialMaterial,
    CredentialMode,
    Scope,
    // Reports
    ExportEntry,
    ExportMapping,
    ReportFile,
    ReportKind,
    ReportMonth,
    ReportSet,
};

/// Convenience result alias used across the workspace.
pub type Result<T, E = ReportsError> = std::result::Result<T, E>;
