//! Create Artwork Use Case
//!
//! Resolves the image of a new artwork and, unless only a preview was
//! requested, stores the artwork as published.

use std::sync::Arc;

use kernel::id::{ArtworkId, UserId};

use crate::application::resolve_image::ImageResolver;
use crate::domain::entities::{Artwork, ArtworkDraft};
use crate::domain::repository::ArtworkRepository;
use crate::domain::value_objects::ImageSource;
use crate::error::ArtworkResult;

/// Create artwork input
pub struct CreateArtworkInput {
    pub draft: ArtworkDraft,
    pub prompt: String,
    pub imagen: Option<String>,
    /// Resolve the image without persisting an artwork
    pub solo_generar: bool,
}

/// Create artwork output
pub struct CreateArtworkOutput {
    pub archivo: String,
    /// `None` for previews
    pub id: Option<ArtworkId>,
}

/// Create artwork use case
pub struct CreateArtworkUseCase<R>
where
    R: ArtworkRepository,
{
    repo: Arc<R>,
    images: Arc<ImageResolver>,
}

impl<R> CreateArtworkUseCase<R>
where
    R: ArtworkRepository,
{
    pub fn new(repo: Arc<R>, images: Arc<ImageResolver>) -> Self {
        Self { repo, images }
    }

    pub async fn execute(
        &self,
        author: UserId,
        input: CreateArtworkInput,
    ) -> ArtworkResult<CreateArtworkOutput> {
        let source = ImageSource::parse(input.imagen.as_deref())?;
        let archivo = self.images.resolve(source, &input.prompt).await?;

        if input.solo_generar {
            tracing::debug!(user_id = %author, "Artwork preview generated");
            return Ok(CreateArtworkOutput { archivo, id: None });
        }

        let artwork = Artwork::new(input.draft, archivo, author);
        self.repo.create(&artwork).await?;

        tracing::info!(
            artwork_id = %artwork.id,
            user_id = %author,
            "Artwork created"
        );

        Ok(CreateArtworkOutput {
            archivo: artwork.archivo_jpg,
            id: Some(artwork.id),
        })
    }
}
