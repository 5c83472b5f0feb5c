//! End-to-end tests of the report pipeline against in-memory collaborators.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use playreports_core::{
    AuthorizationHandle, CredentialMaterial, CredentialMode, ReportMonth, ReportsError, Scope,
};
use playreports_fetch::host::resources::{
    CLIENT_SECRET_RESOURCE, SERVICE_EMAIL_RESOURCE, SERVICE_KEY_RESOURCE,
};
use playreports_fetch::{
    Authenticator, ClientSecret, CredentialSources, HttpClient, IdentityProvider, ObjectRef,
    ObjectStore, RunContext, RunOptions, ServiceAccountKey, SharedTransport, StaticResources,
    StorageConnector, StoredToken, USER_TOKEN_KEY,
};
use playreports_store::{FileTokenStore, MemoryTokenStore, StoreError, TokenStore};
use zip::write::SimpleFileOptions;

const SECRET: &str = r#"{"installed": {"client_id": "id", "client_secret": "secret"}}"#;

// ============================================================================
// Fakes
// ============================================================================

#[derive(Default)]
struct FakeIdentity {
    logins: AtomicUsize,
    refreshes: AtomicUsize,
    service_logins: AtomicUsize,
    can_refresh: bool,
}

impl FakeIdentity {
    fn refreshing() -> Self {
        Self {
            can_refresh: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn interactive_login(
        &self,
        _http: &HttpClient,
        secret: &ClientSecret,
        scopes: &[Scope],
    ) -> Result<StoredToken, ReportsError> {
        assert_eq!(secret.client_id, "id");
        let n = self.logins.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(StoredToken::new(format!("login-{n}"), scopes.to_vec())
            .with_refresh_token(Some("refresh".into()))
            .expiring_in(Some(3600)))
    }

    async fn refresh(
        &self,
        _http: &HttpClient,
        _secret: &ClientSecret,
        token: &StoredToken,
    ) -> Result<Option<StoredToken>, ReportsError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        if !self.can_refresh {
            return Ok(None);
        }
        Ok(Some(
            StoredToken::new("refreshed", token.scopes.clone()).expiring_in(Some(3600)),
        ))
    }

    async fn service_account_token(
        &self,
        _http: &HttpClient,
        key: &ServiceAccountKey,
        scopes: &[Scope],
    ) -> Result<AuthorizationHandle, ReportsError> {
        assert!(!key.private_key_der.is_empty());
        self.service_logins.fetch_add(1, Ordering::SeqCst);
        Ok(AuthorizationHandle::new(
            format!("svc-{}", key.account_email),
            scopes.to_vec(),
            CredentialMode::ServiceAccount,
        ))
    }
}

#[derive(Default)]
struct FakeBucket {
    objects: BTreeMap<String, Vec<u8>>,
    listed: Mutex<Vec<String>>,
}

impl FakeBucket {
    fn with(mut self, name: &str, bytes: Vec<u8>) -> Self {
        self.objects.insert(name.to_string(), bytes);
        self
    }

    fn listed(&self) -> Vec<String> {
        self.listed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for FakeBucket {
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectRef>, ReportsError> {
        assert_eq!(bucket, "pubsite_prod_rev_0123");
        self.listed.lock().unwrap().push(prefix.to_string());
        Ok(self
            .objects
            .keys()
            .filter(|name| name.starts_with(prefix))
            .map(ObjectRef::new)
            .collect())
    }

    async fn download(&self, _bucket: &str, object_name: &str) -> Result<Vec<u8>, ReportsError> {
        self.objects
            .get(object_name)
            .cloned()
            .ok_or_else(|| ReportsError::NotFound(object_name.to_string()))
    }
}

/// Token store whose writes or clears fail.
#[derive(Default)]
struct BrokenTokenStore {
    fail_set: bool,
    fail_clear: bool,
}

fn disk_full() -> StoreError {
    StoreError::Io(std::io::Error::other("disk full"))
}

#[async_trait]
impl TokenStore for BrokenTokenStore {
    fn namespace(&self) -> &str {
        "broken"
    }

    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &[u8]) -> Result<(), StoreError> {
        if self.fail_set { Err(disk_full()) } else { Ok(()) }
    }

    async fn delete(&self, _key: &str) -> Result<(), StoreError> {
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        if self.fail_clear { Err(disk_full()) } else { Ok(()) }
    }

    async fn keys(&self) -> Result<BTreeSet<String>, StoreError> {
        Ok(BTreeSet::new())
    }

    async fn values(&self) -> Result<Vec<Vec<u8>>, StoreError> {
        Ok(Vec::new())
    }
}

struct FakeConnector(Arc<FakeBucket>);

impl StorageConnector for FakeConnector {
    fn connect(&self, _http: HttpClient, auth: AuthorizationHandle) -> Arc<dyn ObjectStore> {
        assert!(auth.access_token().len() > 1);
        Arc::clone(&self.0) as Arc<dyn ObjectStore>
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn zipped(name: &str, content: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer.start_file(name, SimpleFileOptions::default()).unwrap();
    writer.write_all(content.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

fn march_bucket() -> FakeBucket {
    FakeBucket::default()
        .with(
            "earnings/earnings_202102_0123-1.zip",
            zipped("earnings_202102_0123.csv", "old"),
        )
        .with(
            "earnings/earnings_202103_0123-1.zip",
            zipped("earnings_202103_0123.csv", "earnings"),
        )
        .with(
            "sales/salesreport_202103.zip",
            zipped("salesreport_202103.csv", "march sales"),
        )
        .with(
            "sales/salesreport_202104.zip",
            zipped("salesreport_202104.csv", "april sales"),
        )
}

struct Harness {
    ctx: RunContext,
    identity: Arc<FakeIdentity>,
    bucket: Arc<FakeBucket>,
    tokens: Arc<MemoryTokenStore>,
    temp: tempfile::TempDir,
}

fn harness(
    bucket: FakeBucket,
    identity: FakeIdentity,
    tokens: Arc<MemoryTokenStore>,
    sources: CredentialSources,
    resources: StaticResources,
) -> Harness {
    let identity = Arc::new(identity);
    let bucket = Arc::new(bucket);
    let temp = tempfile::tempdir().unwrap();

    let ctx = context(
        &identity,
        &bucket,
        Arc::clone(&tokens) as Arc<dyn TokenStore>,
        sources,
        resources,
        &temp,
    );

    Harness {
        ctx,
        identity,
        bucket,
        tokens,
        temp,
    }
}

fn context(
    identity: &Arc<FakeIdentity>,
    bucket: &Arc<FakeBucket>,
    tokens: Arc<dyn TokenStore>,
    sources: CredentialSources,
    resources: StaticResources,
    temp: &tempfile::TempDir,
) -> RunContext {
    RunContext::builder()
        .identity(Arc::clone(identity) as Arc<dyn IdentityProvider>)
        .tokens(tokens)
        .connector(Arc::new(FakeConnector(Arc::clone(bucket))))
        .resources(Arc::new(resources))
        .sources(sources)
        .unpacker(playreports_fetch::Unpacker::in_dir(temp.path()))
        .build()
        .unwrap()
}

fn user_context(
    identity: &Arc<FakeIdentity>,
    bucket: &Arc<FakeBucket>,
    tokens: Arc<dyn TokenStore>,
    temp: &tempfile::TempDir,
) -> RunContext {
    context(
        identity,
        bucket,
        tokens,
        CredentialSources::default(),
        StaticResources::new().with(CLIENT_SECRET_RESOURCE, SECRET),
        temp,
    )
}

fn user_harness(bucket: FakeBucket) -> Harness {
    harness(
        bucket,
        FakeIdentity::default(),
        Arc::new(MemoryTokenStore::new("playreports")),
        CredentialSources::default(),
        StaticResources::new().with(CLIENT_SECRET_RESOURCE, SECRET),
    )
}

fn march() -> ReportMonth {
    "2021-03-15".parse().unwrap()
}

fn options() -> RunOptions {
    RunOptions::new("pubsite_prod_rev_0123", march())
}

fn pkcs12(passphrase: &str) -> Vec<u8> {
    use openssl::asn1::Asn1Time;
    use openssl::hash::MessageDigest;
    use openssl::pkcs12::Pkcs12;
    use openssl::pkey::PKey;
    use openssl::rsa::Rsa;
    use openssl::x509::{X509, X509NameBuilder};

    let pkey = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();
    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("CN", "svc").unwrap();
    let name = name.build();

    let mut cert = X509::builder().unwrap();
    cert.set_version(2).unwrap();
    cert.set_subject_name(&name).unwrap();
    cert.set_issuer_name(&name).unwrap();
    cert.set_pubkey(&pkey).unwrap();
    cert.set_not_before(&Asn1Time::days_from_now(0).unwrap()).unwrap();
    cert.set_not_after(&Asn1Time::days_from_now(1).unwrap()).unwrap();
    cert.sign(&pkey, MessageDigest::sha256()).unwrap();
    let cert = cert.build();

    Pkcs12::builder()
        .name("privatekey")
        .pkey(&pkey)
        .cert(&cert)
        .build2(passphrase)
        .unwrap()
        .to_der()
        .unwrap()
}

// ============================================================================
// Fetching
// ============================================================================

#[tokio::test]
async fn test_fetch_march_reports() {
    let h = user_harness(march_bucket());

    let outcome = h.ctx.run(&options()).await.unwrap();
    let reports = &outcome.reports;

    assert_eq!(reports.month().key(), "202103");
    assert_eq!(reports.earnings().len(), 1);
    assert_eq!(reports.sales().len(), 2);
    assert_eq!(reports.earnings()[0].original_name(), "earnings_202103_0123.csv");
    assert_eq!(reports.sales()[0].original_name(), "salesreport_202103.csv");
    assert_eq!(reports.sales()[1].original_name(), "salesreport_202104.csv");
    assert_eq!(
        std::fs::read_to_string(reports.sales()[1].path()).unwrap(),
        "april sales"
    );
    assert!(outcome.exported.is_empty());

    assert_eq!(
        h.bucket.listed(),
        vec![
            "earnings/earnings_202103",
            "sales/salesreport_202103",
            "sales/salesreport_202104",
        ]
    );
}

#[tokio::test]
async fn test_temp_files_removed_with_outcome() {
    let h = user_harness(march_bucket());
    let outcome = h.ctx.run(&options()).await.unwrap();

    let paths: Vec<PathBuf> = outcome
        .reports
        .earnings()
        .iter()
        .chain(outcome.reports.sales())
        .map(|f| f.path().to_path_buf())
        .collect();
    assert!(paths.iter().all(|p| p.starts_with(h.temp.path()) && p.exists()));

    drop(outcome);
    assert!(paths.iter().all(|p| !p.exists()));
}

#[tokio::test]
async fn test_december_includes_january_sales() {
    let bucket = FakeBucket::default()
        .with("earnings/earnings_202112_x.zip", zipped("e.csv", "e"))
        .with("sales/salesreport_202201.zip", zipped("s.csv", "s"));
    let h = user_harness(bucket);

    let opts = RunOptions::new("pubsite_prod_rev_0123", "2021-12".parse().unwrap());
    let outcome = h.ctx.run(&opts).await.unwrap();
    assert_eq!(outcome.reports.sales().len(), 1);
    assert_eq!(h.bucket.listed()[2], "sales/salesreport_202201");
}

#[tokio::test]
async fn test_missing_earnings_is_not_found() {
    let bucket = FakeBucket::default().with(
        "sales/salesreport_202103.zip",
        zipped("salesreport_202103.csv", "s"),
    );
    let h = user_harness(bucket);

    let err = h.ctx.run(&options()).await.unwrap_err();
    assert!(matches!(err, ReportsError::NotFound(_)));
    assert!(err.to_string().contains("no earnings report for requested date"));
    assert_eq!(h.bucket.listed(), vec!["earnings/earnings_202103"]);
}

#[tokio::test]
async fn test_multi_entry_archive_is_format_error() {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for name in ["a.csv", "b.csv"] {
        writer.start_file(name, SimpleFileOptions::default()).unwrap();
        writer.write_all(b"x").unwrap();
    }
    let bytes = writer.finish().unwrap().into_inner();

    let h = user_harness(FakeBucket::default().with("earnings/earnings_202103_x.zip", bytes));
    let err = h.ctx.run(&options()).await.unwrap_err();
    assert!(matches!(err, ReportsError::Format(_)));
}

// ============================================================================
// Export
// ============================================================================

#[tokio::test]
async fn test_keep_reports_exports_with_collision_names() {
    let bucket = FakeBucket::default()
        .with("earnings/earnings_202103_a.zip", zipped("x.csv", "first"))
        .with("earnings/earnings_202103_b.zip", zipped("x.csv", "second"))
        .with("sales/salesreport_202103.zip", zipped("y.csv", "sales"));
    let h = user_harness(bucket);
    let out = tempfile::tempdir().unwrap();

    let mut opts = options();
    opts.keep_reports = true;
    opts.output_dir = out.path().to_path_buf();

    let outcome = h.ctx.run(&opts).await.unwrap();
    assert_eq!(
        outcome.exported,
        vec![
            out.path().join("x (1).csv"),
            out.path().join("x (2).csv"),
            out.path().join("y.csv"),
        ]
    );
    assert_eq!(std::fs::read_to_string(out.path().join("x (1).csv")).unwrap(), "first");
    assert_eq!(std::fs::read_to_string(out.path().join("x (2).csv")).unwrap(), "second");

    drop(outcome);
    assert!(out.path().join("y.csv").exists());
}

// ============================================================================
// Credentials & Authorization
// ============================================================================

#[tokio::test]
async fn test_no_credentials_makes_no_calls() {
    let h = harness(
        march_bucket(),
        FakeIdentity::default(),
        Arc::new(MemoryTokenStore::new("playreports")),
        CredentialSources::default(),
        StaticResources::new(),
    );

    let err = h.ctx.run(&options()).await.unwrap_err();
    assert!(matches!(err, ReportsError::Configuration(_)));
    assert!(err.to_string().contains("neither user nor service credentials provided"));

    assert!(!h.ctx.transport().is_initialized());
    assert_eq!(h.identity.logins.load(Ordering::SeqCst), 0);
    assert!(h.bucket.listed().is_empty());
}

#[tokio::test]
async fn test_service_account_preferred_over_user_secret() {
    let dir = tempfile::tempdir().unwrap();
    let key_path = dir.path().join("key.p12");
    let secret_path = dir.path().join("client_secret.json");
    std::fs::write(&key_path, pkcs12("notasecret")).unwrap();
    std::fs::write(&secret_path, SECRET).unwrap();

    let sources = CredentialSources {
        service_key_path: Some(key_path),
        service_account_email: Some("svc@proj.iam.gserviceaccount.com".into()),
        client_secret_path: Some(secret_path),
    };
    let tokens = Arc::new(MemoryTokenStore::new("playreports"));
    let h = harness(
        march_bucket(),
        FakeIdentity::default(),
        Arc::clone(&tokens),
        sources,
        StaticResources::new(),
    );

    h.ctx.run(&options()).await.unwrap();
    assert_eq!(h.identity.service_logins.load(Ordering::SeqCst), 1);
    assert_eq!(h.identity.logins.load(Ordering::SeqCst), 0);

    let handle = h.ctx.authenticator().authorization().unwrap();
    assert_eq!(handle.mode(), CredentialMode::ServiceAccount);
    assert!(tokens.keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_bundled_service_account_with_bad_keystore() {
    let resources = StaticResources::new()
        .with(SERVICE_KEY_RESOURCE, pkcs12("wrong passphrase"))
        .with(SERVICE_EMAIL_RESOURCE, "svc@x");
    let h = harness(
        march_bucket(),
        FakeIdentity::default(),
        Arc::new(MemoryTokenStore::new("playreports")),
        CredentialSources::default(),
        resources,
    );

    let err = h.ctx.run(&options()).await.unwrap_err();
    assert!(matches!(err, ReportsError::Credential(_)));
    assert_eq!(h.identity.service_logins.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cached_token_reused_without_prompt() {
    let h = user_harness(march_bucket());

    h.ctx.run(&options()).await.unwrap();
    h.ctx.run(&options()).await.unwrap();

    assert_eq!(h.identity.logins.load(Ordering::SeqCst), 1);
    assert_eq!(
        h.ctx.authenticator().authorization().unwrap().access_token(),
        "login-1"
    );
    assert!(h.tokens.get(USER_TOKEN_KEY).await.unwrap().is_some());
}

#[tokio::test]
async fn test_expired_token_refreshed_before_prompt() {
    let tokens = Arc::new(MemoryTokenStore::new("playreports"));
    let expired = StoredToken::new("stale", vec![Scope::devstorage_read_only()])
        .with_refresh_token(Some("refresh-me".into()))
        .expiring_in(Some(-10));
    tokens
        .set(USER_TOKEN_KEY, &serde_json::to_vec(&expired).unwrap())
        .await
        .unwrap();

    let h = harness(
        march_bucket(),
        FakeIdentity::refreshing(),
        Arc::clone(&tokens),
        CredentialSources::default(),
        StaticResources::new().with(CLIENT_SECRET_RESOURCE, SECRET),
    );
    h.ctx.run(&options()).await.unwrap();

    assert_eq!(h.identity.refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(h.identity.logins.load(Ordering::SeqCst), 0);

    let stored: StoredToken =
        serde_json::from_slice(&tokens.get(USER_TOKEN_KEY).await.unwrap().unwrap()).unwrap();
    assert_eq!(stored.access_token, "refreshed");
    assert_eq!(stored.refresh_token.as_deref(), Some("refresh-me"));
}

#[tokio::test]
async fn test_unrefreshable_token_prompts_again() {
    let tokens = Arc::new(MemoryTokenStore::new("playreports"));
    let expired = StoredToken::new("stale", vec![Scope::devstorage_read_only()])
        .with_refresh_token(Some("refresh-me".into()))
        .expiring_in(Some(-10));
    tokens
        .set(USER_TOKEN_KEY, &serde_json::to_vec(&expired).unwrap())
        .await
        .unwrap();

    let h = harness(
        march_bucket(),
        FakeIdentity::default(),
        tokens,
        CredentialSources::default(),
        StaticResources::new().with(CLIENT_SECRET_RESOURCE, SECRET),
    );
    h.ctx.run(&options()).await.unwrap();

    assert_eq!(h.identity.refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(h.identity.logins.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_force_reauthorization_clears_store() {
    let h = user_harness(march_bucket());
    h.ctx.run(&options()).await.unwrap();

    let mut opts = options();
    opts.force_reauthorization = true;
    h.ctx.run(&opts).await.unwrap();

    assert_eq!(h.identity.logins.load(Ordering::SeqCst), 2);
    assert_eq!(
        h.ctx.authenticator().authorization().unwrap().access_token(),
        "login-2"
    );
}

#[tokio::test]
async fn test_corrupt_cached_token_prompts() {
    let tokens = Arc::new(MemoryTokenStore::new("playreports"));
    tokens.set(USER_TOKEN_KEY, b"{not json").await.unwrap();

    let h = harness(
        march_bucket(),
        FakeIdentity::default(),
        tokens,
        CredentialSources::default(),
        StaticResources::new().with(CLIENT_SECRET_RESOURCE, SECRET),
    );
    h.ctx.run(&options()).await.unwrap();
    assert_eq!(h.identity.logins.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_corrupt_token_document_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let tokens = Arc::new(FileTokenStore::in_dir(dir.path(), "playreports"));
    std::fs::write(tokens.path(), r#"{"namespace": "playreports", "entr"#).unwrap();

    let identity = Arc::new(FakeIdentity::default());
    let bucket = Arc::new(march_bucket());
    let temp = tempfile::tempdir().unwrap();
    let ctx = user_context(&identity, &bucket, Arc::clone(&tokens) as Arc<dyn TokenStore>, &temp);

    ctx.run(&options()).await.unwrap();
    assert_eq!(identity.logins.load(Ordering::SeqCst), 1);

    let stored: StoredToken =
        serde_json::from_slice(&tokens.get(USER_TOKEN_KEY).await.unwrap().unwrap()).unwrap();
    assert_eq!(stored.access_token, "login-1");
}

#[tokio::test]
async fn test_failed_token_persist_fails_authorization() {
    let identity = Arc::new(FakeIdentity::default());
    let bucket = Arc::new(march_bucket());
    let temp = tempfile::tempdir().unwrap();
    let tokens = Arc::new(BrokenTokenStore {
        fail_set: true,
        ..BrokenTokenStore::default()
    });
    let ctx = user_context(&identity, &bucket, tokens, &temp);

    let err = ctx.run(&options()).await.unwrap_err();
    assert!(matches!(err, ReportsError::Store(_)), "{err:?}");
    assert!(err.to_string().contains("disk full"));

    assert_eq!(identity.logins.load(Ordering::SeqCst), 1);
    assert!(ctx.authenticator().authorization().is_err());
    assert!(bucket.listed().is_empty());
}

#[tokio::test]
async fn test_failed_logout_aborts_forced_run() {
    let identity = Arc::new(FakeIdentity::default());
    let bucket = Arc::new(march_bucket());
    let temp = tempfile::tempdir().unwrap();
    let tokens = Arc::new(BrokenTokenStore {
        fail_clear: true,
        ..BrokenTokenStore::default()
    });
    let ctx = user_context(&identity, &bucket, tokens, &temp);

    let mut opts = options();
    opts.force_reauthorization = true;
    let err = ctx.run(&opts).await.unwrap_err();
    assert!(matches!(err, ReportsError::Store(_)), "{err:?}");

    assert!(!ctx.transport().is_initialized());
    assert_eq!(identity.logins.load(Ordering::SeqCst), 0);
    assert_eq!(identity.service_logins.load(Ordering::SeqCst), 0);
    assert!(bucket.listed().is_empty());
}

#[tokio::test]
async fn test_authorized_transport_requires_authorization() {
    let authenticator = Authenticator::new(
        Arc::new(SharedTransport::default()),
        Arc::new(FakeIdentity::default()),
        Arc::new(MemoryTokenStore::new("ns")),
        vec![Scope::devstorage_read_only()],
    );

    assert!(matches!(
        authenticator.authorized_transport(),
        Err(ReportsError::IllegalState(_))
    ));
    assert!(matches!(
        authenticator.authorization(),
        Err(ReportsError::IllegalState(_))
    ));

    let material = CredentialMaterial::UserSecret {
        secret_json_bytes: SECRET.as_bytes().to_vec(),
    };
    authenticator.authorize(&material).await.unwrap();
    assert!(authenticator.authorized_transport().is_ok());

    authenticator.logout().await.unwrap();
    assert!(authenticator.authorized_transport().is_err());
}

#[tokio::test]
async fn test_malformed_client_secret() {
    let authenticator = Authenticator::new(
        Arc::new(SharedTransport::default()),
        Arc::new(FakeIdentity::default()),
        Arc::new(MemoryTokenStore::new("ns")),
        vec![Scope::devstorage_read_only()],
    );
    let material = CredentialMaterial::UserSecret {
        secret_json_bytes: b"[]".to_vec(),
    };
    let err = authenticator.authorize(&material).await.unwrap_err();
    assert!(matches!(err, ReportsError::Credential(_)));
}
