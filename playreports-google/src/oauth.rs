//! Google OAuth2 identity provider.
//!
//! ## Interactive consent
//!
//! 1. A loopback listener is bound to `127.0.0.1` on a random port.
//! 2. The consent URL is printed to stderr for the user to open.
//! 3. Google redirects the browser to the listener with `code` and `state`.
//! 4. The code is exchanged at the client's token endpoint.
//!
//! Refresh uses the `refresh_token` grant against the same endpoint.
//! Service accounts exchange a signed JWT assertion instead.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use playreports_core::{AuthorizationHandle, CredentialMode, ReportsError, Scope};
use playreports_fetch::{ClientSecret, HttpClient, IdentityProvider, ServiceAccountKey, StoredToken};
use ring::rand::{SecureRandom, SystemRandom};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::error::GoogleError;
use crate::service_account::{JWT_BEARER_GRANT, SERVICE_TOKEN_URI, sign_assertion};
use crate::token::exchange;

/// Largest callback request head accepted from the browser.
const MAX_REQUEST_BYTES: usize = 8 * 1024;

const SUCCESS_PAGE: &str = "<html><body><h3>Authorization complete.</h3>\
    <p>You can close this window and return to the terminal.</p></body></html>";

const FAILURE_PAGE: &str = "<html><body><h3>Authorization failed.</h3>\
    <p>Check the terminal for details.</p></body></html>";

// ============================================================================
// Google Identity
// ============================================================================

/// [`IdentityProvider`] talking to Google's OAuth2 endpoints.
#[derive(Debug, Clone)]
pub struct GoogleIdentity {
    service_token_uri: String,
}

impl GoogleIdentity {
    /// Provider using the public Google endpoints.
    pub fn new() -> Self {
        Self {
            service_token_uri: SERVICE_TOKEN_URI.to_string(),
        }
    }

    /// Provider exchanging service account assertions at `uri`.
    pub fn with_service_token_uri(uri: impl Into<String>) -> Self {
        Self {
            service_token_uri: uri.into(),
        }
    }

    async fn consent(
        &self,
        http: &HttpClient,
        secret: &ClientSecret,
        scopes: &[Scope],
    ) -> Result<StoredToken, GoogleError> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let redirect_uri = format!("http://127.0.0.1:{}", listener.local_addr()?.port());
        let state = random_state()?;

        let url = consent_url(secret, scopes, &redirect_uri, &state)?;
        eprintln!("Open this URL in your browser to authorize access to the reports bucket:\n\n    {url}\n");
        info!(redirect_uri = %redirect_uri, "Waiting for authorization");

        let code = wait_for_code(&listener, &state).await?;
        debug!("Authorization code received");

        let response = exchange(
            http,
            &secret.token_uri,
            &[
                ("code", code.as_str()),
                ("client_id", secret.client_id.as_str()),
                ("client_secret", secret.client_secret.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ],
        )
        .await?;
        Ok(response.into_stored(scopes))
    }
}

impl Default for GoogleIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentity {
    #[instrument(skip_all)]
    async fn interactive_login(
        &self,
        http: &HttpClient,
        secret: &ClientSecret,
        scopes: &[Scope],
    ) -> Result<StoredToken, ReportsError> {
        Ok(self.consent(http, secret, scopes).await?)
    }

    #[instrument(skip_all)]
    async fn refresh(
        &self,
        http: &HttpClient,
        secret: &ClientSecret,
        token: &StoredToken,
    ) -> Result<Option<StoredToken>, ReportsError> {
        let Some(refresh_token) = token.refresh_token.as_deref() else {
            return Ok(None);
        };

        let response = exchange(
            http,
            &secret.token_uri,
            &[
                ("client_id", secret.client_id.as_str()),
                ("client_secret", secret.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ],
        )
        .await?;

        debug!("Access token refreshed");
        Ok(Some(response.into_stored(&token.scopes)))
    }

    #[instrument(skip_all, fields(account = %key.account_email))]
    async fn service_account_token(
        &self,
        http: &HttpClient,
        key: &ServiceAccountKey,
        scopes: &[Scope],
    ) -> Result<AuthorizationHandle, ReportsError> {
        let assertion = sign_assertion(key, scopes, &self.service_token_uri, Utc::now().timestamp())?;

        let response = exchange(
            http,
            &self.service_token_uri,
            &[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())],
        )
        .await?;

        let token = response.into_stored(scopes);
        Ok(AuthorizationHandle::new(
            token.access_token,
            token.scopes,
            CredentialMode::ServiceAccount,
        )
        .with_expiry(token.expires_at)
        .with_token_type(token.token_type))
    }
}

// ============================================================================
// Consent Helpers
// ============================================================================

/// Builds the consent page URL.
pub fn consent_url(
    secret: &ClientSecret,
    scopes: &[Scope],
    redirect_uri: &str,
    state: &str,
) -> Result<Url, GoogleError> {
    let scope = Scope::join(scopes);
    Url::parse_with_params(
        &secret.auth_uri,
        &[
            ("client_id", secret.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", scope.as_str()),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("state", state),
        ],
    )
    .map_err(|e| GoogleError::Consent(format!("invalid auth_uri {}: {e}", secret.auth_uri)))
}

fn random_state() -> Result<String, GoogleError> {
    let mut bytes = [0u8; 16];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| GoogleError::Consent("no system randomness available".to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Outcome of one request to the loopback listener.
#[derive(Debug, PartialEq, Eq)]
enum Callback {
    Code(String),
    Denied(String),
    Unrelated,
}

/// Accepts connections until the redirect carrying the code arrives.
async fn wait_for_code(listener: &TcpListener, state: &str) -> Result<String, GoogleError> {
    loop {
        let (mut stream, peer) = listener.accept().await?;
        debug!(peer = %peer, "Callback connection");

        let request_line = match read_request_line(&mut stream).await {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Unreadable callback request");
                continue;
            }
        };

        match parse_callback(&request_line, state) {
            Ok(Callback::Code(code)) => {
                respond(&mut stream, "200 OK", SUCCESS_PAGE).await;
                return Ok(code);
            }
            Ok(Callback::Denied(reason)) => {
                respond(&mut stream, "200 OK", FAILURE_PAGE).await;
                return Err(GoogleError::Consent(reason));
            }
            Ok(Callback::Unrelated) => respond(&mut stream, "404 Not Found", "").await,
            Err(e) => {
                respond(&mut stream, "400 Bad Request", FAILURE_PAGE).await;
                return Err(e);
            }
        }
    }
}

async fn read_request_line(stream: &mut TcpStream) -> Result<String, GoogleError> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(2).any(|w| w == b"\r\n") || buf.len() >= MAX_REQUEST_BYTES {
            break;
        }
    }

    let head = String::from_utf8_lossy(&buf);
    head.lines()
        .next()
        .map(str::to_string)
        .filter(|line| !line.is_empty())
        .ok_or_else(|| GoogleError::Consent("empty callback request".to_string()))
}

async fn respond(stream: &mut TcpStream, status: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    if let Err(e) = stream.write_all(response.as_bytes()).await {
        debug!(error = %e, "Failed to answer callback request");
    }
    let _ = stream.shutdown().await;
}

/// Interprets the request line of a redirect, e.g. `GET /?code=..&state=.. HTTP/1.1`.
fn parse_callback(request_line: &str, expected_state: &str) -> Result<Callback, GoogleError> {
    let mut parts = request_line.split_whitespace();
    let (Some("GET"), Some(target)) = (parts.next(), parts.next()) else {
        return Ok(Callback::Unrelated);
    };

    let url = Url::parse(&format!("http://127.0.0.1{target}"))
        .map_err(|e| GoogleError::Consent(format!("malformed callback: {e}")))?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if code.is_none() && error.is_none() {
        return Ok(Callback::Unrelated);
    }
    if state.as_deref() != Some(expected_state) {
        return Err(GoogleError::Consent("callback state mismatch".to_string()));
    }
    if let Some(error) = error {
        return Ok(Callback::Denied(format!("authorization denied: {error}")));
    }
    Ok(code.map_or(Callback::Unrelated, Callback::Code))
}

// ============================================================================
// Tests
// ============================================================================
