//! Process-wide HTTP transport.
//!
//! The transport is built lazily on first use and shared by the
//! authenticator and the report fetcher. Construction runs at most once even
//! when several tasks race for it; later callers observe the same instance.

use std::fmt;

use once_cell::sync::OnceCell;
use playreports_core::ReportsError;
use tracing::debug;

use crate::error::HttpError;
use crate::host::http::{HttpClient, TransportConfig};

type Factory = Box<dyn Fn() -> Result<HttpClient, HttpError> + Send + Sync>;

/// Lazily initialized, shared [`HttpClient`].
pub struct SharedTransport {
    factory: Factory,
    cell: OnceCell<HttpClient>,
}

impl SharedTransport {
    /// Transport built from `config` on first use.
    pub fn new(config: TransportConfig) -> Self {
        Self::with_factory(move || HttpClient::try_new(&config))
    }

    /// Transport built by a custom factory on first use.
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn() -> Result<HttpClient, HttpError> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            cell: OnceCell::new(),
        }
    }

    /// Returns the transport, building it if this is the first call.
    ///
    /// A failed build leaves the transport uninitialized.
    pub fn get_or_init(&self) -> Result<&HttpClient, ReportsError> {
        self.cell.get_or_try_init(|| {
            debug!("Initializing shared http transport");
            (self.factory)()
                .map_err(|e| ReportsError::transport("unable to create http transport", e))
        })
    }

    /// Returns the transport if it was already built.
    pub fn get(&self) -> Option<&HttpClient> {
        self.cell.get()
    }

    /// True once the transport has been built.
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl Default for SharedTransport {
    fn default() -> Self {
        Self::new(TransportConfig::default())
    }
}

impl fmt::Debug for SharedTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedTransport")
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
