//! Identity provider abstraction.
//!
//! The authenticator decides *which* credential flow runs and keeps the
//! result; an [`IdentityProvider`] performs the flows against the real
//! OAuth2 endpoints. Tests swap in fakes.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use playreports_core::{AuthorizationHandle, CredentialMode, ReportsError, Scope};
use serde::{Deserialize, Serialize};

use crate::host::http::HttpClient;

/// Default authorization endpoint for installed applications.
pub const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";

/// Default token endpoint.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens are treated as expired this long before their real expiry.
const EXPIRY_SKEW_SECS: i64 = 60;

// ============================================================================
// Identity Provider Trait
// ============================================================================

/// Performs OAuth2 flows on behalf of the authenticator.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Runs the interactive consent flow for an installed application.
    async fn interactive_login(
        &self,
        http: &HttpClient,
        secret: &ClientSecret,
        scopes: &[Scope],
    ) -> Result<StoredToken, ReportsError>;

    /// Exchanges the refresh token of `token` for a new access token.
    ///
    /// Returns `Ok(None)` when the provider cannot refresh.
    async fn refresh(
        &self,
        _http: &HttpClient,
        _secret: &ClientSecret,
        _token: &StoredToken,
    ) -> Result<Option<StoredToken>, ReportsError> {
        Ok(None)
    }

    /// Obtains an access token for a service account.
    async fn service_account_token(
        &self,
        http: &HttpClient,
        key: &ServiceAccountKey,
        scopes: &[Scope],
    ) -> Result<AuthorizationHandle, ReportsError>;
}

// ============================================================================
// Client Secret
// ============================================================================

/// OAuth2 client registration of an installed application.
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientSecret {
    /// Client ID.
    pub client_id: String,
    /// Client secret.
    pub client_secret: String,
    /// Consent page URL.
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    /// Token endpoint URL.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    /// Registered redirect URIs.
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

impl ClientSecret {
    /// Parses a client secret JSON document.
    ///
    /// Accepts the downloadable format with an `installed` or `web` section.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ReportsError> {
        let file: ClientSecretFile = serde_json::from_slice(bytes)
            .map_err(|e| ReportsError::Credential(format!("invalid client secret JSON: {e}")))?;

        let secret = file.installed.or(file.web).ok_or_else(|| {
            ReportsError::Credential(
                "client secret JSON has neither an installed nor a web section".to_string(),
            )
        })?;

        for (field, value) in [
            ("client_id", &secret.client_id),
            ("client_secret", &secret.client_secret),
        ] {
            if value.trim().is_empty() {
                return Err(ReportsError::Credential(format!(
                    "client secret JSON has an empty {field}"
                )));
            }
        }
        Ok(secret)
    }
}

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSecret")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("auth_uri", &self.auth_uri)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Service Account Key
// ============================================================================

/// Decoded service account signing key.
#[derive(Clone)]
pub struct ServiceAccountKey {
    /// Account e-mail, used as the JWT issuer.
    pub account_email: String,
    /// RSA private key as PKCS#1 `RSAPrivateKey` DER.
    pub private_key_der: Vec<u8>,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("account_email", &self.account_email)
            .field("private_key_der", &"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Stored Token
// ============================================================================

/// Persisted OAuth2 token of the interactive user.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoredToken {
    /// The access token.
    pub access_token: String,
    /// Refresh token, if the provider issued one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Token type.
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// When the access token expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Scopes granted.
    #[serde(default)]
    pub scopes: Vec<Scope>,
    /// When the token was obtained and stored.
    #[serde(default = "Utc::now")]
    pub stored_at: DateTime<Utc>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl StoredToken {
    /// Creates a token obtained now.
    pub fn new(access_token: impl Into<String>, scopes: Vec<Scope>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            token_type: default_token_type(),
            expires_at: None,
            scopes,
            stored_at: Utc::now(),
        }
    }

    /// Sets the refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: Option<String>) -> Self {
        self.refresh_token = refresh_token;
        self
    }

    /// Sets the expiry from a lifetime in seconds.
    ///
    /// A lifetime past the representable range leaves the token without an
    /// expiry.
    #[must_use]
    pub fn expiring_in(mut self, seconds: Option<i64>) -> Self {
        let stored_at = self.stored_at;
        self.expires_at = seconds.and_then(|s| {
            Duration::try_seconds(s).and_then(|lifetime| stored_at.checked_add_signed(lifetime))
        });
        self
    }

    /// True if the access token is expired or about to expire.
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|exp| exp <= Utc::now() + Duration::seconds(EXPIRY_SKEW_SECS))
    }

    /// True if the token was granted every scope in `scopes`.
    ///
    /// Tokens recorded without scopes are accepted for any request.
    pub fn covers(&self, scopes: &[Scope]) -> bool {
        self.scopes.is_empty() || scopes.iter().all(|s| self.scopes.contains(s))
    }

    /// True if a refresh can be attempted.
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Converts into an authorization handle for the interactive user.
    pub fn to_handle(&self, scopes: &[Scope]) -> AuthorizationHandle {
        let granted = if self.scopes.is_empty() {
            scopes.to_vec()
        } else {
            self.scopes.clone()
        };
        AuthorizationHandle::new(&self.access_token, granted, CredentialMode::User)
            .with_expiry(self.expires_at)
            .with_token_type(&self.token_type)
    }
}

impl fmt::Debug for StoredToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredToken")
            .field("access_token", &"[REDACTED]")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expires_at", &self.expires_at)
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
