//! Domain Layer
//!
//! Contains entities, value objects, repository traits and the identity
//! provider capability.

pub mod entity;
pub mod identity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::user::User;
pub use identity::{IdentityClaims, IdentityVerifier};
pub use repository::UserRepository;
