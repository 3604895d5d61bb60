//! Artwork Router (`/obras`)

use auth::UserRepository;
use auth::middleware::{AuthMiddlewareState, optional_user, require_user};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, patch, post},
};

use crate::domain::repository::{ArtworkRepository, RatingRepository};
use crate::presentation::handlers::{self, ArtworkAppState};

/// Create the `/obras` router
///
/// `auth` resolves bearer tokens to users for the protected routes and the
/// feed. `/generar` accepts bodies large enough for an inline image at the
/// configured size cap.
pub fn artwork_router<R, U>(state: ArtworkAppState<R>, auth: AuthMiddlewareState<U>) -> Router
where
    R: ArtworkRepository + RatingRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
{
    let body_limit = state.images.config().max_request_bytes();

    let protected = Router::new()
        .route(
            "/generar",
            post(handlers::create::<R>).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/mis-obras", get(handlers::list_own::<R>))
        .route("/{id}/publicar", patch(handlers::set_visibility::<R>))
        .route("/{id}/valorar", post(handlers::rate::<R>))
        .route("/{id}", delete(handlers::delete::<R>))
        .route_layer(middleware::from_fn_with_state(
            auth.clone(),
            require_user::<U>,
        ));

    let feed = Router::new()
        .route("/muro", get(handlers::feed::<R>))
        .route_layer(middleware::from_fn_with_state(auth, optional_user::<U>));

    let public = Router::new().route("/obras/todas", get(handlers::list_all::<R>));

    protected.merge(feed).merge(public).with_state(state)
}
