//! Domain Entities
//!
//! Core business entities for the artwork domain.

use chrono::{DateTime, Utc};
use kernel::id::{ArtworkId, RatingId, UserId};

use crate::domain::value_objects::Score;

/// Descriptive fields supplied by the author
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkDraft {
    pub nombre: String,
    pub descripcion: String,
    pub tipo_arte: String,
}

/// Artwork entity - a row of `obras`
#[derive(Debug, Clone, PartialEq)]
pub struct Artwork {
    pub id: ArtworkId,
    pub nombre: String,
    pub descripcion: String,
    pub tipo_arte: String,
    /// Fully-resolved image URL
    pub archivo_jpg: String,
    pub publicada: bool,
    pub fecha: DateTime<Utc>,
    pub autor_id: UserId,
}

impl Artwork {
    /// Create a published artwork owned by `autor_id`
    pub fn new(draft: ArtworkDraft, image_url: String, autor_id: UserId) -> Self {
        Self {
            id: ArtworkId::new(),
            nombre: draft.nombre,
            descripcion: draft.descripcion,
            tipo_arte: draft.tipo_arte,
            archivo_jpg: image_url,
            publicada: true,
            fecha: Utc::now(),
            autor_id,
        }
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.autor_id == user_id
    }
}

/// Rating entity - a row of `valoraciones`
#[derive(Debug, Clone, PartialEq)]
pub struct Rating {
    pub id: RatingId,
    pub puntuacion: Score,
    pub obra_id: ArtworkId,
    pub usuario_id: UserId,
}

impl Rating {
    pub fn new(obra_id: ArtworkId, usuario_id: UserId, puntuacion: Score) -> Self {
        Self {
            id: RatingId::new(),
            puntuacion,
            obra_id,
            usuario_id,
        }
    }
}

/// Artwork with author name, rating aggregates and the viewer's own rating
#[derive(Debug, Clone, PartialEq)]
pub struct ArtworkView {
    pub artwork: Artwork,
    pub autor_nombre: String,
    /// Mean score rounded to 2 decimals; `None` without ratings
    pub promedio_valoracion: Option<f64>,
    pub cantidad_valoraciones: i64,
    pub ya_valorada: bool,
    pub puntuacion_usuario: Option<i32>,
}
