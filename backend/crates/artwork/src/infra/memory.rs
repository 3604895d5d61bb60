//! In-memory artwork repository
//!
//! Used by tests and by local runs without a database. Author names are
//! looked up in the shared [`MemoryUserRepository`]; clones share state.

use std::collections::HashMap;
use std::sync::Arc;

use auth::MemoryUserRepository;
use kernel::id::{ArtworkId, UserId};
use tokio::sync::RwLock;

use crate::domain::entities::{Artwork, ArtworkView, Rating};
use crate::domain::repository::{ArtworkRepository, RatingRepository};
use crate::domain::services::average_score;
use crate::error::{ArtworkError, ArtworkResult};

#[derive(Clone)]
pub struct MemoryArtworkRepository {
    artworks: Arc<RwLock<HashMap<ArtworkId, Artwork>>>,
    ratings: Arc<RwLock<Vec<Rating>>>,
    users: MemoryUserRepository,
}

impl MemoryArtworkRepository {
    pub fn new(users: MemoryUserRepository) -> Self {
        Self {
            artworks: Arc::default(),
            ratings: Arc::default(),
            users,
        }
    }

    /// Number of stored ratings, across all artworks
    pub async fn rating_count(&self) -> usize {
        self.ratings.read().await.len()
    }

    /// Build views for `artworks`, newest first
    ///
    /// Artworks whose author is unknown are skipped, as an inner join would.
    async fn views(
        &self,
        mut artworks: Vec<Artwork>,
        viewer: Option<&UserId>,
    ) -> Vec<ArtworkView> {
        artworks.sort_by(|a, b| b.fecha.cmp(&a.fecha));

        let ratings = self.ratings.read().await;
        let mut views = Vec::with_capacity(artworks.len());

        for artwork in artworks {
            let Some(autor_nombre) = self.users.display_name_of(&artwork.autor_id).await else {
                continue;
            };

            let scores: Vec<i32> = ratings
                .iter()
                .filter(|r| r.obra_id == artwork.id)
                .map(|r| i32::from(r.puntuacion))
                .collect();

            let puntuacion_usuario = viewer.and_then(|viewer| {
                ratings
                    .iter()
                    .find(|r| r.obra_id == artwork.id && &r.usuario_id == viewer)
                    .map(|r| i32::from(r.puntuacion))
            });

            views.push(ArtworkView {
                autor_nombre,
                promedio_valoracion: average_score(&scores),
                cantidad_valoraciones: scores.len() as i64,
                ya_valorada: puntuacion_usuario.is_some(),
                puntuacion_usuario,
                artwork,
            });
        }

        views
    }

    async fn collect(&self, keep: impl Fn(&Artwork) -> bool) -> Vec<Artwork> {
        self.artworks
            .read()
            .await
            .values()
            .filter(|a| keep(a))
            .cloned()
            .collect()
    }
}

impl ArtworkRepository for MemoryArtworkRepository {
    async fn create(&self, artwork: &Artwork) -> ArtworkResult<()> {
        self.artworks
            .write()
            .await
            .insert(artwork.id, artwork.clone());
        Ok(())
    }

    async fn find_view(
        &self,
        id: &ArtworkId,
        viewer: Option<&UserId>,
    ) -> ArtworkResult<Option<ArtworkView>> {
        let artworks = self.collect(|a| &a.id == id).await;
        Ok(self.views(artworks, viewer).await.into_iter().next())
    }

    async fn list_by_author(&self, author: &UserId) -> ArtworkResult<Vec<ArtworkView>> {
        let artworks = self.collect(|a| a.is_owned_by(author)).await;
        Ok(self.views(artworks, Some(author)).await)
    }

    async fn list_published(&self, viewer: Option<&UserId>) -> ArtworkResult<Vec<ArtworkView>> {
        let artworks = self.collect(|a| a.publicada).await;
        Ok(self.views(artworks, viewer).await)
    }

    async fn list_all(&self) -> ArtworkResult<Vec<Artwork>> {
        let mut artworks = self.collect(|_| true).await;
        artworks.sort_by(|a, b| b.fecha.cmp(&a.fecha));
        Ok(artworks)
    }

    async fn set_published(
        &self,
        id: &ArtworkId,
        owner: &UserId,
        publicada: bool,
    ) -> ArtworkResult<bool> {
        let mut artworks = self.artworks.write().await;
        match artworks.get_mut(id) {
            Some(artwork) if artwork.is_owned_by(owner) => {
                artwork.publicada = publicada;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_owned(&self, id: &ArtworkId, owner: &UserId) -> ArtworkResult<bool> {
        let mut artworks = self.artworks.write().await;
        if !artworks.get(id).is_some_and(|a| a.is_owned_by(owner)) {
            return Ok(false);
        }
        artworks.remove(id);
        self.ratings.write().await.retain(|r| &r.obra_id != id);
        Ok(true)
    }
}

impl RatingRepository for MemoryArtworkRepository {
    async fn add(&self, rating: &Rating) -> ArtworkResult<()> {
        let artworks = self.artworks.read().await;
        if !artworks.contains_key(&rating.obra_id) {
            return Err(ArtworkError::ArtworkNotFound);
        }

        let mut ratings = self.ratings.write().await;
        if ratings
            .iter()
            .any(|r| r.obra_id == rating.obra_id && r.usuario_id == rating.usuario_id)
        {
            return Err(ArtworkError::AlreadyRated);
        }
        ratings.push(rating.clone());
        Ok(())
    }
}
