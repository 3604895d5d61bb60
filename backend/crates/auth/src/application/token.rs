//! Token Service
//!
//! Issues and verifies the signed bearer tokens handed out at login.
//! Claims: `sub` (email), `userName`, `iat`, `exp`.

use std::collections::HashSet;

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind as JwtErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::config::AuthConfig;
use crate::domain::entity::user::User;
use crate::error::{AuthError, AuthResult};

/// Bearer token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(rename = "userName", default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Subject email; guaranteed non-empty after [`TokenService::verify`]
    pub fn subject(&self) -> &str {
        self.sub.as_deref().unwrap_or_default()
    }
}

/// Why a token was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidToken {
    #[error("malformed token")]
    Malformed,
    #[error("bad signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
    #[error("token has no subject")]
    MissingSubject,
}

impl From<InvalidToken> for AuthError {
    fn from(_: InvalidToken) -> Self {
        AuthError::InvalidToken
    }
}

/// Signs and verifies bearer tokens with a shared HMAC secret
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl_secs: i64,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.token_secret.as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: config.token_algorithm,
            ttl_secs: i64::try_from(config.token_ttl.as_secs()).unwrap_or(i64::MAX),
        }
    }

    /// Issue a token for `user`, valid for the configured TTL
    pub fn issue(&self, user: &User) -> AuthResult<String> {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: Some(user.email.as_str().to_string()),
            user_name: Some(user.display_name.as_str().to_string()),
            iat: Some(now),
            exp: Some(now.saturating_add(self.ttl_secs)),
        };
        self.sign(&claims)
    }

    /// Sign arbitrary claims with this service's key
    pub fn sign(&self, claims: &TokenClaims) -> AuthResult<String> {
        encode(&Header::new(self.algorithm), claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Token signing failed: {}", e)))
    }

    /// Decode and check a token
    ///
    /// `exp` is validated when present; `sub` must be a non-empty string.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, InvalidToken> {
        let mut validation = Validation::new(self.algorithm);
        validation.required_spec_claims = HashSet::new();
        validation.leeway = 0;

        let data = decode::<TokenClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                JwtErrorKind::ExpiredSignature => InvalidToken::Expired,
                JwtErrorKind::InvalidSignature | JwtErrorKind::InvalidAlgorithm => {
                    InvalidToken::BadSignature
                }
                _ => InvalidToken::Malformed,
            }
        })?;

        match data.claims.sub.as_deref() {
            Some(sub) if !sub.trim().is_empty() => Ok(data.claims),
            _ => Err(InvalidToken::MissingSubject),
        }
    }
}
