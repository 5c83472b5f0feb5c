//! Service account authorization via signed JWT assertions.
//!
//! The assertion is an RS256 JWT issued by the service account e-mail,
//! scoped to the requested scopes, with the token endpoint as audience. It
//! is exchanged for an access token with the `jwt-bearer` grant.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use playreports_core::Scope;
use playreports_fetch::ServiceAccountKey;
use ring::rand::SystemRandom;
use ring::signature::{RSA_PKCS1_SHA256, RsaKeyPair};
use serde::Serialize;

use crate::error::GoogleError;

/// Token endpoint service account assertions are exchanged at.
pub const SERVICE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Grant type of the assertion exchange.
pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime of an assertion, the maximum Google accepts.
pub const ASSERTION_LIFETIME_SECS: i64 = 3600;

#[derive(Serialize)]
struct Header<'a> {
    alg: &'a str,
    typ: &'a str,
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Builds and signs an assertion for `key`.
pub fn sign_assertion(
    key: &ServiceAccountKey,
    scopes: &[Scope],
    audience: &str,
    issued_at: i64,
) -> Result<String, GoogleError> {
    let header = Header {
        alg: "RS256",
        typ: "JWT",
    };
    let claims = Claims {
        iss: &key.account_email,
        scope: Scope::join(scopes),
        aud: audience,
        iat: issued_at,
        exp: issued_at + ASSERTION_LIFETIME_SECS,
    };

    let signing_input = format!("{}.{}", encode_segment(&header)?, encode_segment(&claims)?);

    let key_pair = RsaKeyPair::from_der(&key.private_key_der)
        .map_err(|e| GoogleError::Signing(format!("unusable service account key: {e}")))?;
    let mut signature = vec![0u8; key_pair.public().modulus_len()];
    key_pair
        .sign(
            &RSA_PKCS1_SHA256,
            &SystemRandom::new(),
            signing_input.as_bytes(),
            &mut signature,
        )
        .map_err(|_| GoogleError::Signing("RSA signing failed".to_string()))?;

    Ok(format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature)))
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String, GoogleError> {
    let json = serde_json::to_vec(value)
        .map_err(|e| GoogleError::Signing(format!("unable to encode assertion: {e}")))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

// ============================================================================
// Tests
// ============================================================================
