//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use kernel::id::{ArtworkId, UserId};

use crate::domain::entities::{Artwork, ArtworkView, Rating};
use crate::error::ArtworkResult;

/// Artwork repository trait
#[trait_variant::make(ArtworkRepository: Send)]
pub trait LocalArtworkRepository {
    /// Persist a new artwork
    async fn create(&self, artwork: &Artwork) -> ArtworkResult<()>;

    /// Aggregated view of one artwork, with `viewer`'s rating when given
    async fn find_view(
        &self,
        id: &ArtworkId,
        viewer: Option<&UserId>,
    ) -> ArtworkResult<Option<ArtworkView>>;

    /// All artworks of `author`, published or not, newest first
    async fn list_by_author(&self, author: &UserId) -> ArtworkResult<Vec<ArtworkView>>;

    /// Published artworks, newest first
    async fn list_published(&self, viewer: Option<&UserId>) -> ArtworkResult<Vec<ArtworkView>>;

    /// Every artwork, newest first, without aggregates
    async fn list_all(&self) -> ArtworkResult<Vec<Artwork>>;

    /// Set the published flag of an artwork owned by `owner`
    /// Returns false if no such artwork exists
    async fn set_published(
        &self,
        id: &ArtworkId,
        owner: &UserId,
        publicada: bool,
    ) -> ArtworkResult<bool>;

    /// Delete an artwork owned by `owner` together with its ratings
    /// Returns false if no such artwork exists
    async fn delete_owned(&self, id: &ArtworkId, owner: &UserId) -> ArtworkResult<bool>;
}

/// Rating repository trait
#[trait_variant::make(RatingRepository: Send)]
pub trait LocalRatingRepository {
    /// Insert a rating
    ///
    /// Fails with `AlreadyRated` if the user already rated the artwork and
    /// with `ArtworkNotFound` if the artwork is gone.
    async fn add(&self, rating: &Rating) -> ArtworkResult<()>;
}
