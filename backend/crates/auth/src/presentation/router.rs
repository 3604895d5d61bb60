//! Auth Router (`/usuarios`)

use axum::{Router, routing::post};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::UserRepository;
use crate::infra::google::GoogleIdentityVerifier;
use crate::infra::postgres::PgUserRepository;
use crate::presentation::handlers::{self, AuthAppState};

/// Build the state for the PostgreSQL repository, wiring Google login when a
/// client ID is configured
pub fn pg_auth_state(repo: PgUserRepository, config: AuthConfig) -> AuthAppState<PgUserRepository> {
    let identity = config.google_client_id.clone().map(|client_id| {
        Arc::new(GoogleIdentityVerifier::new(client_id)) as Arc<dyn crate::IdentityVerifier>
    });
    AuthAppState::new(repo, config, identity)
}

/// Create the `/usuarios` router for any repository implementation
pub fn auth_router<U>(state: AuthAppState<U>) -> Router
where
    U: UserRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/registrar", post(handlers::register::<U>))
        .route("/login", post(handlers::login::<U>))
        .route("/google-login", post(handlers::google_login::<U>))
        .with_state(state)
}
