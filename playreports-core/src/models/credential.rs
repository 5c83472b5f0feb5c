//! Credential types.
//!
//! - [`CredentialMaterial`] - Raw material picked by the resolver
//! - [`CredentialMode`] - Which authorization path produced a handle
//! - [`Scope`] - Permission grant requested from the identity provider
//! - [`AuthorizationHandle`] - The usable result of an authorization

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Scope
// ============================================================================

/// A named permission grant requested from the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(String);

impl Scope {
    /// Read-only access to Cloud Storage objects.
    pub const DEVSTORAGE_READ_ONLY: &'static str =
        "https://www.googleapis.com/auth/devstorage.read_only";

    /// Creates a scope from its URI.
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// The scope every report run needs.
    pub fn devstorage_read_only() -> Self {
        Self::new(Self::DEVSTORAGE_READ_ONLY)
    }

    /// Returns the scope URI.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Joins scopes with spaces, as OAuth2 endpoints expect.
    pub fn join(scopes: &[Scope]) -> String {
        scopes
            .iter()
            .map(Scope::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Credential Material
// ============================================================================

/// Credential material chosen for this run.
///
/// Exactly one variant is active. Service-account material always wins over
/// user material when both are available.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialMaterial {
    /// Non-interactive identity backed by a PKCS#12 key.
    ServiceAccount {
        /// Raw PKCS#12 keystore bytes.
        key_bytes: Vec<u8>,
        /// Service account e-mail address.
        account_email: String,
    },
    /// Interactive user identity backed by an OAuth2 client secret.
    UserSecret {
        /// Raw `client_secret.json` bytes.
        secret_json_bytes: Vec<u8>,
    },
}

impl CredentialMaterial {
    /// Returns which authorization path this material selects.
    pub fn mode(&self) -> CredentialMode {
        match self {
            Self::ServiceAccount { .. } => CredentialMode::ServiceAccount,
            Self::UserSecret { .. } => CredentialMode::User,
        }
    }
}

impl fmt::Debug for CredentialMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServiceAccount {
                key_bytes,
                account_email,
            } => f
                .debug_struct("ServiceAccount")
                .field("key_bytes", &format_args!("<{} bytes>", key_bytes.len()))
                .field("account_email", account_email)
                .finish(),
            Self::UserSecret { secret_json_bytes } => f
                .debug_struct("UserSecret")
                .field(
                    "secret_json_bytes",
                    &format_args!("<{} bytes>", secret_json_bytes.len()),
                )
                .finish(),
        }
    }
}

/// Authorization path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialMode {
    /// Signed-assertion service account flow.
    ServiceAccount,
    /// Interactive user consent flow.
    User,
}

impl CredentialMode {
    /// Returns the display name for this mode.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ServiceAccount => "service account",
            Self::User => "user",
        }
    }
}

impl fmt::Display for CredentialMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ============================================================================
// Authorization Handle
// ============================================================================

/// Time-scoped capability granting API access for a fixed scope set.
///
/// Owned by the authenticator for the lifetime of a run and shared
/// read-only with the object store client.
#[derive(Clone)]
pub struct AuthorizationHandle {
    access_token: String,
    token_type: String,
    expires_at: Option<DateTime<Utc>>,
    scopes: Vec<Scope>,
    mode: CredentialMode,
}

impl AuthorizationHandle {
    /// Creates a bearer handle.
    pub fn new(access_token: impl Into<String>, scopes: Vec<Scope>, mode: CredentialMode) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: "Bearer".to_string(),
            expires_at: None,
            scopes,
            mode,
        }
    }

    /// Sets the expiry time.
    #[must_use]
    pub fn with_expiry(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = expires_at;
        self
    }

    /// Sets the token type (defaults to `Bearer`).
    #[must_use]
    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = token_type.into();
        self
    }

    /// The raw access token.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Value for the HTTP `Authorization` header.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }

    /// When the handle stops being valid, if known.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Scopes this handle was granted for.
    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Which path produced this handle.
    pub fn mode(&self) -> CredentialMode {
        self.mode
    }

    /// Returns true if the handle has expired (with a one minute buffer).
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|at| at <= Utc::now() + Duration::seconds(60))
    }
}

impl fmt::Debug for AuthorizationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationHandle")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("scopes", &self.scopes)
            .field("mode", &self.mode)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
