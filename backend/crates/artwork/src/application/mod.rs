//! Application Layer - Use Cases
//!
//! This layer orchestrates domain logic and infrastructure.

pub mod config;
pub mod create_artwork;
pub mod generation;
pub mod listing;
pub mod manage;
pub mod rate;
pub mod resolve_image;

// Re-exports
pub use config::ArtworkConfig;
pub use create_artwork::{CreateArtworkInput, CreateArtworkOutput, CreateArtworkUseCase};
pub use generation::{GenerationPoller, GenerationState};
pub use listing::{ListAllUseCase, ListFeedUseCase, ListOwnUseCase};
pub use manage::{DeleteArtworkUseCase, SetVisibilityUseCase};
pub use rate::RateArtworkUseCase;
pub use resolve_image::ImageResolver;
