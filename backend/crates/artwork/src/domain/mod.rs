//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (Artwork, Rating, ArtworkView)
//! - Domain value objects (Score, ImageSource)
//! - Capability traits for image storage, download and generation
//! - Repository traits (interfaces)

pub mod entities;
pub mod repository;
pub mod services;
pub mod value_objects;
