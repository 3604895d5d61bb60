//! HTTP Handlers

use std::sync::Arc;

use auth::middleware::{CurrentUser, Viewer};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use kernel::id::ArtworkId;

use crate::application::{
    CreateArtworkInput, CreateArtworkUseCase, DeleteArtworkUseCase, ImageResolver,
    ListAllUseCase, ListFeedUseCase, ListOwnUseCase, RateArtworkUseCase, SetVisibilityUseCase,
};
use crate::domain::entities::ArtworkDraft;
use crate::domain::repository::{ArtworkRepository, RatingRepository};
use crate::error::{ArtworkError, ArtworkResult};
use crate::presentation::dto::{
    ArtworkResponse, ArtworkViewResponse, CreateArtworkQuery, CreateArtworkRequest,
    CreateArtworkResponse, DetailResponse, PublishRequest, PublishResponse, RateRequest,
};

/// Shared state for artwork handlers
#[derive(Clone)]
pub struct ArtworkAppState<R>
where
    R: ArtworkRepository + RatingRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub images: Arc<ImageResolver>,
}

impl<R> ArtworkAppState<R>
where
    R: ArtworkRepository + RatingRepository + Clone + Send + Sync + 'static,
{
    pub fn new(repo: R, images: ImageResolver) -> Self {
        Self {
            repo: Arc::new(repo),
            images: Arc::new(images),
        }
    }
}

/// Ids that do not parse cannot exist
fn parse_id(raw: &str) -> ArtworkResult<ArtworkId> {
    raw.parse().map_err(|_| ArtworkError::ArtworkNotFound)
}

// ============================================================================
// Create
// ============================================================================

/// Body rejections as JSON errors; an oversize body is an oversize image
fn create_body_error(rejection: JsonRejection) -> ArtworkError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ArtworkError::InvalidImage("La imagen supera el tamaño máximo permitido".to_string())
    } else {
        ArtworkError::InvalidRequest(rejection.body_text())
    }
}

/// POST /obras/generar
pub async fn create<R>(
    State(state): State<ArtworkAppState<R>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<CreateArtworkQuery>,
    body: Result<Json<CreateArtworkRequest>, JsonRejection>,
) -> ArtworkResult<Json<CreateArtworkResponse>>
where
    R: ArtworkRepository + RatingRepository + Clone + Send + Sync + 'static,
{
    let Json(req) = body.map_err(create_body_error)?;
    let use_case = CreateArtworkUseCase::new(state.repo.clone(), state.images.clone());

    let output = use_case
        .execute(
            user.user_id,
            CreateArtworkInput {
                draft: ArtworkDraft {
                    nombre: req.nombre,
                    descripcion: req.descripcion,
                    tipo_arte: req.tipo_arte,
                },
                prompt: req.prompt,
                imagen: req.imagen,
                solo_generar: query.solo_generar,
            },
        )
        .await?;

    let mensaje = match output.id {
        Some(_) => "Obra generada y guardada",
        None => "Imagen generada temporalmente",
    };

    Ok(Json(CreateArtworkResponse {
        mensaje: mensaje.to_string(),
        archivo: output.archivo,
        id: output.id.map(|id| id.to_string()),
    }))
}

// ============================================================================
// Listing
// ============================================================================

/// GET /obras/mis-obras
pub async fn list_own<R>(
    State(state): State<ArtworkAppState<R>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ArtworkResult<Json<Vec<ArtworkViewResponse>>>
where
    R: ArtworkRepository + RatingRepository + Clone + Send + Sync + 'static,
{
    let views = ListOwnUseCase::new(state.repo.clone())
        .execute(&user.user_id)
        .await?;

    Ok(Json(views.into_iter().map(Into::into).collect()))
}

/// GET /obras/muro
pub async fn feed<R>(
    State(state): State<ArtworkAppState<R>>,
    Extension(Viewer(viewer)): Extension<Viewer>,
) -> ArtworkResult<Json<Vec<ArtworkViewResponse>>>
where
    R: ArtworkRepository + RatingRepository + Clone + Send + Sync + 'static,
{
    let viewer_id = viewer.map(|u| u.user_id);
    let views = ListFeedUseCase::new(state.repo.clone())
        .execute(viewer_id.as_ref())
        .await?;

    Ok(Json(views.into_iter().map(Into::into).collect()))
}

/// GET /obras/obras/todas
pub async fn list_all<R>(
    State(state): State<ArtworkAppState<R>>,
) -> ArtworkResult<Json<Vec<ArtworkResponse>>>
where
    R: ArtworkRepository + RatingRepository + Clone + Send + Sync + 'static,
{
    let artworks = ListAllUseCase::new(state.repo.clone()).execute().await?;

    Ok(Json(artworks.into_iter().map(Into::into).collect()))
}

// ============================================================================
// Owner operations
// ============================================================================

/// PATCH /obras/{id}/publicar
pub async fn set_visibility<R>(
    State(state): State<ArtworkAppState<R>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<PublishRequest>,
) -> ArtworkResult<Json<PublishResponse>>
where
    R: ArtworkRepository + RatingRepository + Clone + Send + Sync + 'static,
{
    let id = parse_id(&id)?;
    let view = SetVisibilityUseCase::new(state.repo.clone())
        .execute(&user.user_id, &id, req.publicada)
        .await?;

    Ok(Json(PublishResponse {
        mensaje: "Visibilidad actualizada".to_string(),
        id: id.to_string(),
        publicada: view.artwork.publicada,
        obra: view.into(),
    }))
}

/// DELETE /obras/{id}
pub async fn delete<R>(
    State(state): State<ArtworkAppState<R>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ArtworkResult<Json<DetailResponse>>
where
    R: ArtworkRepository + RatingRepository + Clone + Send + Sync + 'static,
{
    let id = parse_id(&id)?;
    DeleteArtworkUseCase::new(state.repo.clone())
        .execute(&user.user_id, &id)
        .await?;

    Ok(Json(DetailResponse::new("Obra eliminada")))
}

/// POST /obras/{id}/valorar
pub async fn rate<R>(
    State(state): State<ArtworkAppState<R>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<RateRequest>,
) -> ArtworkResult<Json<DetailResponse>>
where
    R: ArtworkRepository + RatingRepository + Clone + Send + Sync + 'static,
{
    let id = parse_id(&id)?;
    RateArtworkUseCase::new(state.repo.clone(), state.repo.clone())
        .execute(&user.user_id, &id, req.puntuacion)
        .await?;

    Ok(Json(DetailResponse::new("Valoración registrada")))
}
