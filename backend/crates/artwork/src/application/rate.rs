//! Rate Artwork Use Case

use std::sync::Arc;

use kernel::id::{ArtworkId, UserId};

use crate::domain::entities::Rating;
use crate::domain::repository::{ArtworkRepository, RatingRepository};
use crate::domain::value_objects::Score;
use crate::error::{ArtworkError, ArtworkResult};

/// Rate artwork use case
pub struct RateArtworkUseCase<A, R>
where
    A: ArtworkRepository,
    R: RatingRepository,
{
    artwork_repo: Arc<A>,
    rating_repo: Arc<R>,
}

impl<A, R> RateArtworkUseCase<A, R>
where
    A: ArtworkRepository,
    R: RatingRepository,
{
    pub fn new(artwork_repo: Arc<A>, rating_repo: Arc<R>) -> Self {
        Self {
            artwork_repo,
            rating_repo,
        }
    }

    pub async fn execute(
        &self,
        rater: &UserId,
        id: &ArtworkId,
        puntuacion: i64,
    ) -> ArtworkResult<()> {
        let score = Score::new(puntuacion)?;

        if self.artwork_repo.find_view(id, None).await?.is_none() {
            return Err(ArtworkError::ArtworkNotFound);
        }

        // Duplicates are decided by the store's unique constraint
        self.rating_repo
            .add(&Rating::new(*id, *rater, score))
            .await?;

        tracing::info!(
            artwork_id = %id,
            user_id = %rater,
            puntuacion = score.value(),
            "Artwork rated"
        );
        Ok(())
    }
}
