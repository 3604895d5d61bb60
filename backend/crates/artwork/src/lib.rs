//! Artwork Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository and capability traits
//! - `application/` - Use cases, image resolution, generation polling
//! - `infra/` - PostgreSQL and in-memory repositories, image service clients
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Artworks created from a data URL, a remote URL, or a prompt sent to an
//!   external generation API (placeholder image when none is configured)
//! - Images always stored as fully-resolved URLs (Cloudinary or local disk)
//! - Public feed with rating average, count and the viewer's own rating
//! - One rating per user and artwork, enforced by the store

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::ArtworkConfig;
pub use application::generation::{GenerationPoller, GenerationState};
pub use application::resolve_image::ImageResolver;
pub use domain::services::{FetchedImage, ImageFetcher, ImageGenerator, ImageStore, JobStatus};
pub use error::{ArtworkError, ArtworkResult};
pub use infra::{
    CloudinaryImageStore, HordeImageGenerator, HttpImageFetcher, LocalImageStore,
    MemoryArtworkRepository, PgArtworkRepository, cloudinary::CloudinaryCredentials,
};
pub use presentation::{ArtworkAppState, artwork_router};

#[cfg(test)]
mod tests;
