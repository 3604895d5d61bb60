//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod current_user;
pub mod google_login;
pub mod login;
pub mod register;
pub mod token;

// Re-exports
pub use config::AuthConfig;
pub use current_user::CurrentUserUseCase;
pub use google_login::{GoogleLoginOutput, GoogleLoginUseCase};
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use register::{RegisterInput, RegisterOutput, RegisterUseCase};
pub use token::{InvalidToken, TokenClaims, TokenService};
