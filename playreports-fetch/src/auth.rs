//! Client authorization.
//!
//! The [`Authenticator`] turns resolved credential material into an
//! [`AuthorizationHandle`]. Two paths exist:
//!
//! - **Service account**: the PKCS#12 key is decoded and handed to the
//!   identity provider's signed-assertion flow. Nothing is persisted.
//! - **User**: a cached token under the [`USER_TOKEN_KEY`] key is reused
//!   while valid, refreshed when expired, and otherwise replaced by running
//!   the interactive consent flow. New tokens are persisted.
//!
//! Both paths run over the shared transport.

use std::sync::{Arc, PoisonError, RwLock};

use openssl::pkcs12::Pkcs12;
use playreports_core::{AuthorizationHandle, CredentialMaterial, ReportsError, Scope};
use playreports_store::{StoreError, TokenStore};
use tracing::{debug, info, instrument, warn};

use crate::host::http::HttpClient;
use crate::host::identity::{ClientSecret, IdentityProvider, ServiceAccountKey, StoredToken};
use crate::host::transport::SharedTransport;

/// Token store key of the interactive user's token.
pub const USER_TOKEN_KEY: &str = "user";

/// Passphrase Google uses for every generated PKCS#12 key file.
pub const KEYSTORE_PASSPHRASE: &str = "notasecret";

// ============================================================================
// Authenticator
// ============================================================================

/// Produces and holds the run's authorization.
pub struct Authenticator {
    transport: Arc<SharedTransport>,
    identity: Arc<dyn IdentityProvider>,
    tokens: Arc<dyn TokenStore>,
    scopes: Vec<Scope>,
    current: RwLock<Option<AuthorizationHandle>>,
}

impl Authenticator {
    /// Creates an authenticator requesting `scopes`.
    pub fn new(
        transport: Arc<SharedTransport>,
        identity: Arc<dyn IdentityProvider>,
        tokens: Arc<dyn TokenStore>,
        scopes: Vec<Scope>,
    ) -> Self {
        Self {
            transport,
            identity,
            tokens,
            scopes,
            current: RwLock::new(None),
        }
    }

    /// Scopes requested on authorization.
    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Token store used for the interactive user.
    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Authorizes the client with `material`.
    ///
    /// Initializes the shared transport on first use.
    #[instrument(skip(self, material), fields(mode = %material.mode()))]
    pub async fn authorize(
        &self,
        material: &CredentialMaterial,
    ) -> Result<AuthorizationHandle, ReportsError> {
        let http = self.transport.get_or_init()?;

        let handle = match material {
            CredentialMaterial::ServiceAccount {
                key_bytes,
                account_email,
            } => {
                let key = decode_keystore(key_bytes, account_email)?;
                self.identity
                    .service_account_token(http, &key, &self.scopes)
                    .await?
            }
            CredentialMaterial::UserSecret { secret_json_bytes } => {
                let secret = ClientSecret::from_json(secret_json_bytes)?;
                self.authorize_user(http, &secret).await?
            }
        };

        info!(mode = %handle.mode(), expires_at = ?handle.expires_at(), "Client authorized");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(handle.clone());
        Ok(handle)
    }

    /// Returns the current authorization.
    pub fn authorization(&self) -> Result<AuthorizationHandle, ReportsError> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| ReportsError::IllegalState("client is not authorized".to_string()))
    }

    /// Returns the transport once the client has been authorized.
    pub fn authorized_transport(&self) -> Result<&HttpClient, ReportsError> {
        self.authorization()?;
        self.transport.get().ok_or_else(|| {
            ReportsError::IllegalState("http transport is not initialized".to_string())
        })
    }

    /// Forgets every persisted authorization.
    pub async fn logout(&self) -> Result<(), ReportsError> {
        self.tokens.logout().await?;
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
        info!(namespace = %self.tokens.namespace(), "Logged out");
        Ok(())
    }

    async fn authorize_user(
        &self,
        http: &HttpClient,
        secret: &ClientSecret,
    ) -> Result<AuthorizationHandle, ReportsError> {
        if let Some(cached) = self.load_cached().await? {
            if !cached.covers(&self.scopes) {
                debug!("Cached token lacks requested scopes");
            } else if !cached.is_expired() {
                debug!("Reusing cached token");
                return Ok(cached.to_handle(&self.scopes));
            } else if cached.can_refresh() {
                match self.identity.refresh(http, secret, &cached).await {
                    Ok(Some(mut refreshed)) => {
                        if refreshed.refresh_token.is_none() {
                            refreshed.refresh_token = cached.refresh_token.clone();
                        }
                        self.persist(&refreshed).await?;
                        debug!("Cached token refreshed");
                        return Ok(refreshed.to_handle(&self.scopes));
                    }
                    Ok(None) => debug!("Identity provider cannot refresh tokens"),
                    Err(e) => warn!(error = %e, "Token refresh failed, prompting again"),
                }
            }
        }

        let token = self
            .identity
            .interactive_login(http, secret, &self.scopes)
            .await?;
        self.persist(&token).await?;
        Ok(token.to_handle(&self.scopes))
    }

    async fn load_cached(&self) -> Result<Option<StoredToken>, ReportsError> {
        let bytes = match self.tokens.get(USER_TOKEN_KEY).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Ok(None),
            Err(e @ (StoreError::Serialization(_) | StoreError::Corrupt { .. })) => {
                warn!(error = %e, "Discarding unreadable token store");
                self.tokens.clear().await?;
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice(&bytes) {
            Ok(token) => Ok(Some(token)),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable cached token");
                Ok(None)
            }
        }
    }

    async fn persist(&self, token: &StoredToken) -> Result<(), ReportsError> {
        let bytes = serde_json::to_vec(token)
            .map_err(|e| ReportsError::Store(format!("unable to serialize token: {e}")))?;
        self.tokens.set(USER_TOKEN_KEY, &bytes).await?;
        debug!(namespace = %self.tokens.namespace(), "Token persisted");
        Ok(())
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("transport", &self.transport)
            .field("namespace", &self.tokens.namespace())
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Keystore Decoding
// ============================================================================

/// Decodes a PKCS#12 service account key file.
pub fn decode_keystore(bytes: &[u8], account_email: &str) -> Result<ServiceAccountKey, ReportsError> {
    let credential = |msg: &str, e: &dyn std::fmt::Display| {
        ReportsError::Credential(format!("{msg}: {e}"))
    };

    let parsed = Pkcs12::from_der(bytes)
        .map_err(|e| credential("invalid PKCS#12 key file", &e))?
        .parse2(KEYSTORE_PASSPHRASE)
        .map_err(|e| credential("unable to open PKCS#12 key file", &e))?;

    let pkey = parsed.pkey.ok_or_else(|| {
        ReportsError::Credential("PKCS#12 key file contains no private key".to_string())
    })?;
    let private_key_der = pkey
        .rsa()
        .and_then(|rsa| rsa.private_key_to_der())
        .map_err(|e| credential("service account key is not an RSA key", &e))?;

    Ok(ServiceAccountKey {
        account_email: account_email.to_string(),
        private_key_der,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_keystore(b"definitely not pkcs12", "svc@x").unwrap_err();
        assert_eq!(err.kind(), "credential");
    }

    #[test]
    fn test_decode_generated_keystore() {
        use openssl::asn1::Asn1Time;
        use openssl::hash::MessageDigest;
        use openssl::pkey::PKey;
        use openssl::rsa::Rsa;
        use openssl::x509::{X509, X509NameBuilder};

        let rsa = Rsa::generate(2048).unwrap();
        let pkey = PKey::from_rsa(rsa).unwrap();

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

        let der = Pkcs12::builder()
            .name("privatekey")
            .pkey(&pkey)
            .cert(&cert)
            .build2(KEYSTORE_PASSPHRASE)
            .unwrap()
            .to_der()
            .unwrap();

        let key = decode_keystore(&der, "svc@proj.iam.gserviceaccount.com").unwrap();
        assert_eq!(key.account_email, "svc@proj.iam.gserviceaccount.com");
        assert_eq!(
            key.private_key_der,
            pkey.rsa().unwrap().private_key_to_der().unwrap()
        );

        let wrong = Pkcs12::builder()
            .pkey(&pkey)
            .cert(&cert)
            .build2("other")
            .unwrap()
            .to_der()
            .unwrap();
        assert_eq!(decode_keystore(&wrong, "svc@x").unwrap_err().kind(), "credential");
    }
}
