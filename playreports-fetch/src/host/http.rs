//! HTTP client with tracing and a domain allowlist.
//!
//! Every network call of a run goes through one [`HttpClient`]: the OAuth
//! token endpoints, the consent code exchange, and the storage API.

use reqwest::{Client, Response, header};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::error::HttpError;

/// User agent string for `PlayReports`.
pub const USER_AGENT: &str = concat!("PlayReports/", env!("CARGO_PKG_VERSION"));

/// Domains the Google APIs live under.
pub const GOOGLE_DOMAINS: &[&str] = &["googleapis.com", "google.com"];

/// Longest response body kept in a [`HttpError::Status`].
const MAX_ERROR_BODY: usize = 512;

// ============================================================================
// Transport Config
// ============================================================================

/// Settings used when the HTTP client is built.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// User agent sent with every request.
    pub user_agent: String,
    /// Per-request timeout. `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
    /// Hosts requests may go to. `None` allows any host.
    pub allowed_domains: Option<Vec<String>>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            timeout: None,
            allowed_domains: Some(GOOGLE_DOMAINS.iter().map(|d| (*d).to_string()).collect()),
        }
    }
}

impl TransportConfig {
    /// Config without any host restriction.
    pub fn unrestricted() -> Self {
        Self {
            allowed_domains: None,
            ..Self::default()
        }
    }
}

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client wrapper with tracing and domain allowlist.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    allowed_domains: Option<Vec<String>>,
}

impl HttpClient {
    /// Builds a client from `config`.
    ///
    /// Fails when the TLS backend cannot be initialized.
    pub fn try_new(config: &TransportConfig) -> Result<Self, HttpError> {
        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            inner: builder.build()?,
            allowed_domains: config.allowed_domains.clone(),
        })
    }

    /// Checks if a URL's domain is allowed.
    pub fn is_domain_allowed(&self, url: &str) -> Result<(), HttpError> {
        let Some(ref allowed) = self.allowed_domains else {
            return Ok(());
        };

        let parsed = Url::parse(url).map_err(|e| HttpError::InvalidUrl(e.to_string()))?;

        let host = parsed
            .host_str()
            .ok_or_else(|| HttpError::InvalidUrl("No host in URL".to_string()))?;

        let allowed = allowed
            .iter()
            .any(|domain| host == domain || host.ends_with(&format!(".{domain}")));

        if allowed {
            Ok(())
        } else {
            Err(HttpError::DomainNotAllowed(host.to_string()))
        }
    }

    /// Performs a GET request with an authorization header.
    #[instrument(skip(self, auth_header), fields(url = %url))]
    pub async fn get_with_auth(&self, url: &str, auth_header: &str) -> Result<Response, HttpError> {
        self.is_domain_allowed(url)?;
        debug!("GET request with auth");

        let response = self
            .inner
            .get(url)
            .header(header::AUTHORIZATION, auth_header)
            .send()
            .await?;
        debug!(status = %response.status(), "Response received");
        Ok(response)
    }

    /// Performs a POST request with form data.
    #[instrument(skip(self, form), fields(url = %url))]
    pub async fn post_form<T: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        form: &T,
    ) -> Result<Response, HttpError> {
        self.is_domain_allowed(url)?;
        debug!("POST request with form data");

        let response = self.inner.post(url).form(form).send().await?;
        debug!(status = %response.status(), "Response received");
        Ok(response)
    }

    /// Returns the inner reqwest client for advanced operations.
    pub fn inner(&self) -> &Client {
        &self.inner
    }
}

// ============================================================================
// Response Extensions
// ============================================================================

/// Turns non-success responses into [`HttpError::Status`].
pub async fn ensure_success(response: Response) -> Result<Response, HttpError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    Err(HttpError::Status {
        status: status.as_u16(),
        body,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_allowlist() {
        let client = HttpClient::try_new(&TransportConfig::default()).unwrap();

        assert!(client.is_domain_allowed("https://storage.googleapis.com/storage/v1/b/x/o").is_ok());
        assert!(client.is_domain_allowed("https://oauth2.googleapis.com/token").is_ok());
        assert!(client.is_domain_allowed("https://accounts.google.com/o/oauth2/auth").is_ok());

        assert!(matches!(
            client.is_domain_allowed("https://evil.com/steal"),
            Err(HttpError::DomainNotAllowed(_))
        ));
        assert!(client.is_domain_allowed("https://notgoogle.com").is_err());
    }

    #[test]
    fn test_no_domain_restrictions() {
        let client = HttpClient::try_new(&TransportConfig::unrestricted()).unwrap();
        assert!(client.is_domain_allowed("http://127.0.0.1:8080/token").is_ok());
    }

    #[test]
    fn test_invalid_url() {
        let client = HttpClient::try_new(&TransportConfig::default()).unwrap();
        assert!(matches!(
            client.is_domain_allowed("not-a-valid-url"),
            Err(HttpError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_user_agent() {
        assert!(USER_AGENT.starts_with("PlayReports/"));
        assert_eq!(TransportConfig::default().timeout, None);
    }
}
