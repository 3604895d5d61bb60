//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository and identity traits
//! - `application/` - Use cases and the token service
//! - `infra/` - PostgreSQL, in-memory and Google implementations
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Local registration and email + password login
//! - Sign-In With Google (ID token verified against Google's JWKS)
//! - Signed bearer tokens (`sub` = email) with configurable lifetime
//! - `require_user` / `optional_user` middleware for other routers
//!
//! ## Security Model
//! - Passwords hashed with Argon2id
//! - Accounts created through Google have no local password and cannot use
//!   the password login

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::token::{InvalidToken, TokenClaims, TokenService};
pub use domain::entity::user::User;
pub use domain::identity::{IdentityClaims, IdentityVerifier};
pub use domain::repository::UserRepository;
pub use error::{AuthError, AuthResult};
pub use infra::{GoogleIdentityVerifier, MemoryUserRepository, PgUserRepository};
pub use presentation::router::{auth_router, pg_auth_state};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
