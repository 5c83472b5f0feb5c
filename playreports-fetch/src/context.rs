//! Run context wiring the report pipeline together.
//!
//! A [`RunContext`] owns the shared transport and every collaborator a run
//! needs. One run resolves credentials, authorizes, fetches the month's
//! reports, and optionally exports them.

use std::path::PathBuf;
use std::sync::Arc;

use playreports_core::{ReportMonth, ReportSet, ReportsError, Scope};
use playreports_store::TokenStore;
use tracing::{info, instrument};

use crate::auth::Authenticator;
use crate::export::export;
use crate::host::http::TransportConfig;
use crate::host::identity::IdentityProvider;
use crate::host::resources::{ResourceLoader, StaticResources};
use crate::host::storage::StorageConnector;
use crate::host::transport::SharedTransport;
use crate::reports::ReportFetcher;
use crate::resolver::{CredentialResolver, CredentialSources};
use crate::unpack::Unpacker;

// ============================================================================
// Run Options
// ============================================================================

/// Per-run settings.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Bucket holding the report objects.
    pub bucket: String,
    /// Month to fetch.
    pub month: ReportMonth,
    /// Clear the token store before authorizing.
    pub force_reauthorization: bool,
    /// Export reports under their original names.
    pub keep_reports: bool,
    /// Export destination.
    pub output_dir: PathBuf,
}

impl RunOptions {
    /// Options for `month` from `bucket`, exporting nothing.
    pub fn new(bucket: impl Into<String>, month: ReportMonth) -> Self {
        Self {
            bucket: bucket.into(),
            month,
            force_reauthorization: false,
            keep_reports: false,
            output_dir: PathBuf::from("."),
        }
    }
}

/// Result of a run.
#[derive(Debug)]
pub struct RunOutcome {
    /// Fetched reports. Temp files are removed when this is dropped.
    pub reports: ReportSet,
    /// Exported copies, empty unless reports were kept.
    pub exported: Vec<PathBuf>,
}

// ============================================================================
// Run Context
// ============================================================================

/// Everything a report run needs.
pub struct RunContext {
    transport: Arc<SharedTransport>,
    resolver: CredentialResolver,
    authenticator: Authenticator,
    connector: Arc<dyn StorageConnector>,
    unpacker: Unpacker,
}

impl RunContext {
    /// Creates a builder for the context.
    pub fn builder() -> RunContextBuilder {
        RunContextBuilder::new()
    }

    /// The shared transport.
    pub fn transport(&self) -> &Arc<SharedTransport> {
        &self.transport
    }

    /// The authenticator.
    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    /// The credential resolver.
    pub fn resolver(&self) -> &CredentialResolver {
        &self.resolver
    }

    /// Runs the whole pipeline once.
    #[instrument(skip(self, options), fields(bucket = %options.bucket, month = %options.month))]
    pub async fn run(&self, options: &RunOptions) -> Result<RunOutcome, ReportsError> {
        if options.force_reauthorization {
            self.authenticator.logout().await?;
        }

        let material = self.resolver.resolve()?;
        let handle = self.authenticator.authorize(&material).await?;
        let http = self.authenticator.authorized_transport()?.clone();

        let store = self.connector.connect(http, handle);
        let fetcher = ReportFetcher::new(store, self.unpacker.clone());
        let reports = fetcher.fetch(&options.bucket, options.month).await?;

        let exported = if options.keep_reports {
            export(&reports.export_mapping(), &options.output_dir).await?
        } else {
            Vec::new()
        };

        info!(reports = reports.len(), exported = exported.len(), "Run complete");
        Ok(RunOutcome { reports, exported })
    }

    /// Forgets every persisted authorization.
    pub async fn logout(&self) -> Result<(), ReportsError> {
        self.authenticator.logout().await
    }
}

impl std::fmt::Debug for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("transport", &self.transport)
            .field("resolver", &self.resolver)
            .field("authenticator", &self.authenticator)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Run Context Builder
// ============================================================================

/// Builder for constructing a [`RunContext`].
pub struct RunContextBuilder {
    transport: Option<Arc<SharedTransport>>,
    identity: Option<Arc<dyn IdentityProvider>>,
    tokens: Option<Arc<dyn TokenStore>>,
    connector: Option<Arc<dyn StorageConnector>>,
    resources: Option<Arc<dyn ResourceLoader>>,
    sources: CredentialSources,
    scopes: Vec<Scope>,
    unpacker: Unpacker,
}

impl RunContextBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            transport: None,
            identity: None,
            tokens: None,
            connector: None,
            resources: None,
            sources: CredentialSources::default(),
            scopes: vec![Scope::devstorage_read_only()],
            unpacker: Unpacker::new(),
        }
    }

    /// Sets the shared transport.
    pub fn transport(mut self, transport: Arc<SharedTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the identity provider.
    pub fn identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Sets the token store.
    pub fn tokens(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Sets the storage connector.
    pub fn connector(mut self, connector: Arc<dyn StorageConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Sets the bundled credential resources.
    pub fn resources(mut self, resources: Arc<dyn ResourceLoader>) -> Self {
        self.resources = Some(resources);
        self
    }

    /// Sets the explicit credential sources.
    pub fn sources(mut self, sources: CredentialSources) -> Self {
        self.sources = sources;
        self
    }

    /// Sets the requested scopes.
    pub fn scopes(mut self, scopes: Vec<Scope>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Sets the archive unpacker.
    pub fn unpacker(mut self, unpacker: Unpacker) -> Self {
        self.unpacker = unpacker;
        self
    }

    /// Builds the context.
    ///
    /// The identity provider, token store, and storage connector are required.
    pub fn build(self) -> Result<RunContext, ReportsError> {
        let missing = |what: &str| ReportsError::Configuration(format!("run context needs {what}"));

        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(SharedTransport::new(TransportConfig::default())));
        let identity = self.identity.ok_or_else(|| missing("an identity provider"))?;
        let tokens = self.tokens.ok_or_else(|| missing("a token store"))?;
        let connector = self.connector.ok_or_else(|| missing("a storage connector"))?;
        let resources = self
            .resources
            .unwrap_or_else(|| Arc::new(StaticResources::new()));

        Ok(RunContext {
            authenticator: Authenticator::new(Arc::clone(&transport), identity, tokens, self.scopes),
            resolver: CredentialResolver::new(self.sources, resources),
            transport,
            connector,
            unpacker: self.unpacker,
        })
    }
}

impl Default for RunContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
