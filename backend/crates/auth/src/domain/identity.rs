//! External Identity Provider
//!
//! Capability for verifying third-party ID tokens (Google Sign-In).

use async_trait::async_trait;

use crate::error::AuthResult;

/// Claims extracted from a verified ID token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaims {
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Verifies an ID token issued by an external provider
///
/// Implementations return `AuthError::InvalidIdentityToken` for any token
/// that fails signature, audience, issuer or expiry checks.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> AuthResult<IdentityClaims>;
}
