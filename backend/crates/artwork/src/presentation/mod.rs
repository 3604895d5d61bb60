//! Presentation Layer
//!
//! HTTP handlers and DTOs for the API.

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::ArtworkAppState;
pub use router::artwork_router;
