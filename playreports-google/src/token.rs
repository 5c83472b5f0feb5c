//! Token endpoint exchange shared by every grant type.

use playreports_core::Scope;
use playreports_fetch::{HttpClient, HttpError, StoredToken};
use serde::Deserialize;
use tracing::debug;

use crate::error::GoogleError;

/// Token endpoint response.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenResponse {
    /// Granted scopes, falling back to the requested ones.
    pub fn granted_scopes(&self, requested: &[Scope]) -> Vec<Scope> {
        match self.scope.as_deref().map(str::trim) {
            Some(scope) if !scope.is_empty() => scope.split_whitespace().map(Scope::new).collect(),
            _ => requested.to_vec(),
        }
    }

    /// Converts into a persistable token.
    pub fn into_stored(self, requested: &[Scope]) -> StoredToken {
        let scopes = self.granted_scopes(requested);
        let mut token = StoredToken::new(self.access_token, scopes)
            .with_refresh_token(self.refresh_token)
            .expiring_in(self.expires_in);
        if let Some(token_type) = self.token_type {
            token.token_type = token_type;
        }
        token
    }
}

/// Posts `form` to a token endpoint and parses the response.
pub(crate) async fn exchange(
    http: &HttpClient,
    token_uri: &str,
    form: &[(&str, &str)],
) -> Result<TokenResponse, GoogleError> {
    let response = http.post_form(token_uri, form).await?;
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        debug!(status = %status, "Token endpoint rejected request");
        return Err(GoogleError::TokenRejected {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| GoogleError::InvalidResponse(format!("token response: {}", HttpError::from(e))))
}
