// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `PlayReports` Google
//!
//! Google implementations of the host traits in `playreports-fetch`:
//!
//! - [`GoogleIdentity`] - OAuth2 consent over a loopback redirect, token
//!   refresh, and service account JWT assertions
//! - [`GcsClient`] / [`GcsConnector`] - Cloud Storage JSON API v1 listing
//!   and media download

pub mod error;
pub mod oauth;
pub mod service_account;
pub mod storage;
mod token;

pub use error::GoogleError;
pub use oauth::GoogleIdentity;
pub use service_account::{SERVICE_TOKEN_URI, sign_assertion};
pub use storage::{GcsClient, GcsConnector, STORAGE_BASE_URL};
