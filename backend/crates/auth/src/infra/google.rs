//! Google ID token verification
//!
//! Verifies Sign-In With Google credentials locally against Google's
//! published signing keys (JWKS). Keys are cached in-process.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header, jwk::JwkSet};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::domain::identity::{IdentityClaims, IdentityVerifier};
use crate::error::{AuthError, AuthResult};

/// Google's JWKS endpoint
pub const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";

/// Accepted `iss` values for Google ID tokens
const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

const JWKS_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Unknown `kid`s do not trigger a refetch more often than this
const JWKS_MIN_REFRESH: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct GoogleIdClaims {
    email: Option<String>,
    /// Google sends a bool; some legacy tokens carry the string "true"
    email_verified: Option<serde_json::Value>,
    name: Option<String>,
    picture: Option<String>,
}

impl GoogleIdClaims {
    fn email_is_unverified(&self) -> bool {
        matches!(
            &self.email_verified,
            Some(serde_json::Value::Bool(false))
        ) || matches!(
            &self.email_verified,
            Some(serde_json::Value::String(s)) if s.eq_ignore_ascii_case("false")
        )
    }
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

impl CachedKeys {
    fn is_expired(&self) -> bool {
        self.fetched_at.elapsed() > JWKS_CACHE_TTL
    }

    fn is_recent(&self) -> bool {
        self.fetched_at.elapsed() < JWKS_MIN_REFRESH
    }
}

fn unknown_kid(kid: &str) -> AuthError {
    AuthError::InvalidIdentityToken(format!("unknown kid {}", kid))
}

/// Verifies Google ID tokens for one OAuth client ID
pub struct GoogleIdentityVerifier {
    client_id: String,
    jwks_url: String,
    http: reqwest::Client,
    cache: RwLock<Option<CachedKeys>>,
}

impl GoogleIdentityVerifier {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self::with_jwks_url(client_id, GOOGLE_JWKS_URL)
    }

    pub fn with_jwks_url(client_id: impl Into<String>, jwks_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("obras-api/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            client_id: client_id.into(),
            jwks_url: jwks_url.into(),
            http,
            cache: RwLock::new(None),
        }
    }

    /// Find the decoding key for `kid`, refreshing the key set when it is
    /// stale or does not contain `kid` (Google rotates keys).
    ///
    /// A set fetched less than [`JWKS_MIN_REFRESH`] ago is trusted as
    /// complete, so forged `kid`s cannot force a download per request.
    async fn decoding_key(&self, kid: &str) -> AuthResult<DecodingKey> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref()
                && !cached.is_expired()
            {
                if let Some(jwk) = cached.keys.find(kid) {
                    return DecodingKey::from_jwk(jwk)
                        .map_err(|e| AuthError::InvalidIdentityToken(e.to_string()));
                }
                if cached.is_recent() {
                    return Err(unknown_kid(kid));
                }
            }
        }

        let keys = self.fetch_keys().await?;
        let key = keys
            .find(kid)
            .ok_or_else(|| unknown_kid(kid))
            .and_then(|jwk| {
                DecodingKey::from_jwk(jwk)
                    .map_err(|e| AuthError::InvalidIdentityToken(e.to_string()))
            });

        *self.cache.write().await = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });

        key
    }

    async fn fetch_keys(&self) -> AuthResult<JwkSet> {
        tracing::debug!(url = %self.jwks_url, "Fetching Google signing keys");

        let response = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AuthError::IdentityProviderUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::IdentityProviderUnavailable(format!(
                "JWKS request failed: {}",
                response.status()
            )));
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::IdentityProviderUnavailable(e.to_string()))
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.client_id.as_str()]);
        validation.set_issuer(&GOOGLE_ISSUERS);
        validation
    }
}

#[async_trait]
impl IdentityVerifier for GoogleIdentityVerifier {
    async fn verify(&self, credential: &str) -> AuthResult<IdentityClaims> {
        let header = decode_header(credential)
            .map_err(|e| AuthError::InvalidIdentityToken(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidIdentityToken("missing kid".to_string()))?;

        let key = self.decoding_key(&kid).await?;

        let data = decode::<GoogleIdClaims>(credential, &key, &self.validation())
            .map_err(|e| AuthError::InvalidIdentityToken(e.to_string()))?;
        let claims = data.claims;

        if claims.email_is_unverified() {
            return Err(AuthError::InvalidIdentityToken(
                "email not verified".to_string(),
            ));
        }

        let email = claims
            .email
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| AuthError::InvalidIdentityToken("missing email".to_string()))?;

        Ok(IdentityClaims {
            email,
            name: claims.name,
            picture: claims.picture,
        })
    }
}
