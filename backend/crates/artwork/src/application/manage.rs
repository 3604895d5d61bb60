//! Owner Operations
//!
//! Publishing and deleting artworks. Both treat an artwork owned by someone
//! else exactly like a missing one.

use std::sync::Arc;

use kernel::id::{ArtworkId, UserId};

use crate::domain::entities::ArtworkView;
use crate::domain::repository::ArtworkRepository;
use crate::error::{ArtworkError, ArtworkResult};

/// Set visibility use case
pub struct SetVisibilityUseCase<R>
where
    R: ArtworkRepository,
{
    repo: Arc<R>,
}

impl<R> SetVisibilityUseCase<R>
where
    R: ArtworkRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        owner: &UserId,
        id: &ArtworkId,
        publicada: bool,
    ) -> ArtworkResult<ArtworkView> {
        if !self.repo.set_published(id, owner, publicada).await? {
            return Err(ArtworkError::ArtworkNotFound);
        }

        tracing::info!(artwork_id = %id, publicada, "Artwork visibility changed");

        self.repo
            .find_view(id, Some(owner))
            .await?
            .ok_or(ArtworkError::ArtworkNotFound)
    }
}

/// Delete artwork use case
pub struct DeleteArtworkUseCase<R>
where
    R: ArtworkRepository,
{
    repo: Arc<R>,
}

impl<R> DeleteArtworkUseCase<R>
where
    R: ArtworkRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, owner: &UserId, id: &ArtworkId) -> ArtworkResult<()> {
        if !self.repo.delete_owned(id, owner).await? {
            return Err(ArtworkError::ArtworkNotFound);
        }

        tracing::info!(artwork_id = %id, user_id = %owner, "Artwork deleted");
        Ok(())
    }
}
