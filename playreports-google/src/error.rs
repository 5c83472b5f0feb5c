//! Google backend error types.

use playreports_core::ReportsError;
use playreports_fetch::HttpError;
use thiserror::Error;

/// Error type for the Google OAuth2 and Cloud Storage backends.
#[derive(Debug, Error)]
pub enum GoogleError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// The token endpoint refused the grant.
    #[error("Token request rejected ({status}): {body}")]
    TokenRejected {
        /// Status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// A response could not be understood.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The JWT assertion could not be signed.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// The user declined consent or the callback was unusable.
    #[error("Consent failed: {0}")]
    Consent(String),

    /// The requested object does not exist.
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// Local I/O error on the loopback listener.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<GoogleError> for ReportsError {
    fn from(err: GoogleError) -> Self {
        match err {
            GoogleError::TokenRejected { .. } | GoogleError::Signing(_) | GoogleError::Consent(_) => {
                ReportsError::Credential(err.to_string())
            }
            GoogleError::ObjectNotFound(name) => ReportsError::NotFound(name),
            GoogleError::Io(e) => ReportsError::Io(e),
            GoogleError::Http(_) | GoogleError::InvalidResponse(_) => {
                ReportsError::Transport(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let rejected: ReportsError = GoogleError::TokenRejected {
            status: 400,
            body: "invalid_grant".into(),
        }
        .into();
        assert_eq!(rejected.kind(), "credential");

        let missing: ReportsError = GoogleError::ObjectNotFound("x.zip".into()).into();
        assert_eq!(missing.kind(), "not_found");

        let bad: ReportsError = GoogleError::InvalidResponse("no items".into()).into();
        assert_eq!(bad.kind(), "transport");
    }
}
