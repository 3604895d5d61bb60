//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Token whose subject has no user row
    #[error("Usuario no encontrado")]
    UserNotFound,

    #[error("El email ya está registrado")]
    EmailTaken,

    /// Unknown email or wrong password
    #[error("Credenciales inválidas")]
    InvalidCredentials,

    /// Account created through Google has no local password
    #[error("Esta cuenta usa inicio de sesión con Google")]
    PasswordNotSet,

    /// Missing, malformed, tampered or expired bearer token
    #[error("Token inválido")]
    InvalidToken,

    /// Google ID token rejected
    #[error("Token inválido")]
    InvalidIdentityToken(String),

    /// Google login is not configured on this server
    #[error("Google login is not configured")]
    IdentityProviderDisabled,

    /// Google JWKS endpoint unreachable
    #[error("Identity provider unavailable: {0}")]
    IdentityProviderUnavailable(String),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::EmailTaken => ErrorKind::Conflict,
            AuthError::InvalidCredentials
            | AuthError::PasswordNotSet
            | AuthError::InvalidToken
            | AuthError::InvalidIdentityToken(_)
            | AuthError::IdentityProviderDisabled => ErrorKind::Unauthorized,
            AuthError::IdentityProviderUnavailable(_) => ErrorKind::BadGateway,
            AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string());
        match self {
            AuthError::InvalidToken => err.with_action("Inicia sesión de nuevo"),
            AuthError::PasswordNotSet => err.with_action("Usa el botón de Google"),
            _ => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::IdentityProviderUnavailable(msg) => {
                tracing::error!(message = %msg, "Google JWKS fetch failed");
            }
            AuthError::InvalidCredentials | AuthError::PasswordNotSet => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::InvalidIdentityToken(reason) => {
                tracing::warn!(reason = %reason, "Google ID token rejected");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest => AuthError::Validation(err.message().to_string()),
            _ => AuthError::Internal(err.to_string()),
        }
    }
}
