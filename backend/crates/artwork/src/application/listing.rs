//! Listing Use Cases
//!
//! The author's own artworks, the public feed and the unfiltered list.

use std::sync::Arc;

use kernel::id::UserId;

use crate::domain::entities::{Artwork, ArtworkView};
use crate::domain::repository::ArtworkRepository;
use crate::error::ArtworkResult;

/// Artworks of the caller, published or not
pub struct ListOwnUseCase<R>
where
    R: ArtworkRepository,
{
    repo: Arc<R>,
}

impl<R> ListOwnUseCase<R>
where
    R: ArtworkRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, author: &UserId) -> ArtworkResult<Vec<ArtworkView>> {
        self.repo.list_by_author(author).await
    }
}

/// Public feed; the viewer's own ratings are flagged when known
pub struct ListFeedUseCase<R>
where
    R: ArtworkRepository,
{
    repo: Arc<R>,
}

impl<R> ListFeedUseCase<R>
where
    R: ArtworkRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, viewer: Option<&UserId>) -> ArtworkResult<Vec<ArtworkView>> {
        self.repo.list_published(viewer).await
    }
}

/// Every artwork without aggregates
pub struct ListAllUseCase<R>
where
    R: ArtworkRepository,
{
    repo: Arc<R>,
}

impl<R> ListAllUseCase<R>
where
    R: ArtworkRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self) -> ArtworkResult<Vec<Artwork>> {
        self.repo.list_all().await
    }
}
