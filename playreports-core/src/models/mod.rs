//! Domain models for `PlayReports`.
//!
//! ## Submodules
//!
//! - [`credential`] - Credential material, modes, scopes, authorization handles
//! - [`period`] - Report month arithmetic
//! - [`report`] - Report files, report sets, export mappings

mod credential;
mod period;
mod report;

pub use credential::{AuthorizationHandle, CredentialMaterial, CredentialMode, Scope};
pub use period::ReportMonth;
pub use report::{ExportEntry, ExportMapping, ReportFile, ReportKind, ReportSet};
