//! Artwork Error Types
//!
//! Artwork-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Artwork-specific result type alias
pub type ArtworkResult<T> = Result<T, ArtworkError>;

/// Artwork-specific error variants
#[derive(Debug, Error)]
pub enum ArtworkError {
    /// Artwork does not exist or is not owned by the caller
    #[error("Obra no encontrada")]
    ArtworkNotFound,

    /// Second rating of the same artwork by the same user
    #[error("Ya valoraste esta obra")]
    AlreadyRated,

    /// Score outside 1..=5
    #[error("Puntuación inválida")]
    InvalidScore,

    /// `imagen` is neither a data URL nor an http(s) URL, or its payload
    /// cannot be used
    #[error("{0}")]
    InvalidImage(String),

    /// URL points into the image store but names no stored file
    #[error("Imagen local no encontrada")]
    StoredImageNotFound,

    /// Request body could not be read as a create request
    #[error("{0}")]
    InvalidRequest(String),

    /// A client-supplied image URL could not be downloaded
    #[error("No se pudo descargar la imagen desde la URL")]
    ImageDownload(String),

    /// Generation API or image store failed
    #[error("Servicio externo no disponible: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ArtworkError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ArtworkError::ArtworkNotFound | ArtworkError::StoredImageNotFound => {
                ErrorKind::NotFound
            }
            ArtworkError::AlreadyRated => ErrorKind::Conflict,
            ArtworkError::InvalidScore
            | ArtworkError::InvalidImage(_)
            | ArtworkError::InvalidRequest(_)
            | ArtworkError::ImageDownload(_) => ErrorKind::BadRequest,
            ArtworkError::Upstream(_) => ErrorKind::BadGateway,
            ArtworkError::Database(_) | ArtworkError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string());
        match self {
            ArtworkError::InvalidScore => err.with_action("Usa un valor entre 1 y 5"),
            ArtworkError::Upstream(_) => err.with_action("Inténtalo de nuevo más tarde"),
            _ => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            ArtworkError::Database(e) => {
                tracing::error!(error = %e, "Artwork database error");
            }
            ArtworkError::Internal(msg) => {
                tracing::error!(message = %msg, "Artwork internal error");
            }
            ArtworkError::Upstream(msg) => {
                tracing::error!(message = %msg, "Artwork upstream failure");
            }
            ArtworkError::AlreadyRated => {
                tracing::warn!("Duplicate rating rejected");
            }
            ArtworkError::ImageDownload(reason) => {
                tracing::debug!(reason = %reason, "Image download rejected");
            }
            _ => {
                tracing::debug!(error = %self, "Artwork error");
            }
        }
    }
}

impl From<ArtworkError> for AppError {
    fn from(err: ArtworkError) -> Self {
        err.to_app_error()
    }
}

impl IntoResponse for ArtworkError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}
