//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Artwork, ArtworkView};

// ============================================================================
// Create
// ============================================================================

/// POST /obras/generar
#[derive(Debug, Clone, Deserialize)]
pub struct CreateArtworkRequest {
    pub nombre: String,
    pub descripcion: String,
    #[serde(rename = "tipoArte")]
    pub tipo_arte: String,
    pub prompt: String,
    /// Data URL, http(s) URL, or absent
    #[serde(default)]
    pub imagen: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateArtworkQuery {
    #[serde(default)]
    pub solo_generar: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateArtworkResponse {
    pub mensaje: String,
    pub archivo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

// ============================================================================
// Listing
// ============================================================================

/// Artwork with author and rating aggregates
#[derive(Debug, Clone, Serialize)]
pub struct ArtworkViewResponse {
    pub id: String,
    pub nombre: String,
    pub descripcion: String,
    #[serde(rename = "tipoArte")]
    pub tipo_arte: String,
    #[serde(rename = "archivoJPG")]
    pub archivo_jpg: String,
    pub publicada: bool,
    pub fecha: DateTime<Utc>,
    pub autor_id: String,
    pub autor_nombre: String,
    pub promedio_valoracion: Option<f64>,
    pub cantidad_valoraciones: i64,
    pub ya_valorada: bool,
    pub puntuacion_usuario: Option<i32>,
}

impl From<ArtworkView> for ArtworkViewResponse {
    fn from(view: ArtworkView) -> Self {
        let artwork = ArtworkResponse::from(view.artwork);
        Self {
            id: artwork.id,
            nombre: artwork.nombre,
            descripcion: artwork.descripcion,
            tipo_arte: artwork.tipo_arte,
            archivo_jpg: artwork.archivo_jpg,
            publicada: artwork.publicada,
            fecha: artwork.fecha,
            autor_id: artwork.autor_id,
            autor_nombre: view.autor_nombre,
            promedio_valoracion: view.promedio_valoracion,
            cantidad_valoraciones: view.cantidad_valoraciones,
            ya_valorada: view.ya_valorada,
            puntuacion_usuario: view.puntuacion_usuario,
        }
    }
}

/// Plain artwork row, GET /obras/obras/todas
#[derive(Debug, Clone, Serialize)]
pub struct ArtworkResponse {
    pub id: String,
    pub nombre: String,
    pub descripcion: String,
    #[serde(rename = "tipoArte")]
    pub tipo_arte: String,
    #[serde(rename = "archivoJPG")]
    pub archivo_jpg: String,
    pub publicada: bool,
    pub fecha: DateTime<Utc>,
    pub autor_id: String,
}

impl From<Artwork> for ArtworkResponse {
    fn from(artwork: Artwork) -> Self {
        Self {
            id: artwork.id.to_string(),
            nombre: artwork.nombre,
            descripcion: artwork.descripcion,
            tipo_arte: artwork.tipo_arte,
            archivo_jpg: artwork.archivo_jpg,
            publicada: artwork.publicada,
            fecha: artwork.fecha,
            autor_id: artwork.autor_id.to_string(),
        }
    }
}

// ============================================================================
// Owner operations
// ============================================================================

/// PATCH /obras/{id}/publicar
#[derive(Debug, Clone, Deserialize)]
pub struct PublishRequest {
    #[serde(default = "default_publicada")]
    pub publicada: bool,
}

fn default_publicada() -> bool {
    true
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishResponse {
    pub mensaje: String,
    pub id: String,
    pub publicada: bool,
    pub obra: ArtworkViewResponse,
}

/// POST /obras/{id}/valorar
#[derive(Debug, Clone, Deserialize)]
pub struct RateRequest {
    pub puntuacion: i64,
}

/// `{"detail": "..."}` confirmation body
#[derive(Debug, Clone, Serialize)]
pub struct DetailResponse {
    pub detail: String,
}

impl DetailResponse {
    pub fn new(detail: &str) -> Self {
        Self {
            detail: detail.to_string(),
        }
    }
}
