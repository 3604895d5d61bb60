//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use jsonwebtoken::Algorithm;

/// Secret used when `SECRET_KEY` is not set. Development only.
pub const DEVELOPMENT_TOKEN_SECRET: &str = "clave-super-secreta";

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Shared secret for signing bearer tokens
    pub token_secret: String,
    /// HMAC algorithm (HS256, HS384 or HS512)
    pub token_algorithm: Algorithm,
    /// Token lifetime (`exp = iat + token_ttl`)
    pub token_ttl: Duration,
    /// Google OAuth client ID; Google login is disabled when `None`
    pub google_client_id: Option<String>,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: DEVELOPMENT_TOKEN_SECRET.to_string(),
            token_algorithm: Algorithm::HS256,
            token_ttl: Duration::from_secs(24 * 3600), // 1440 minutes
            google_client_id: None,
            password_pepper: None,
        }
    }
}

impl AuthConfig {
    /// Parse an HMAC algorithm name as accepted in `ALGORITHM`
    pub fn parse_algorithm(name: &str) -> Option<Algorithm> {
        match name.trim().to_ascii_uppercase().as_str() {
            "HS256" => Some(Algorithm::HS256),
            "HS384" => Some(Algorithm::HS384),
            "HS512" => Some(Algorithm::HS512),
            _ => None,
        }
    }

    /// Whether the development secret is still in use
    pub fn uses_development_secret(&self) -> bool {
        self.token_secret == DEVELOPMENT_TOKEN_SECRET
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}
