//! Auth Middleware
//!
//! Bearer-token middleware for routers that need the caller's identity.
//! Use with `axum::middleware::from_fn_with_state`.

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use platform::bearer::extract_bearer;
use std::sync::Arc;

use crate::application::{CurrentUserUseCase, TokenService};
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::error::AuthError;

/// Middleware state
#[derive(Clone)]
pub struct AuthMiddlewareState<U>
where
    U: UserRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<U>,
    pub tokens: Arc<TokenService>,
}

/// Authenticated caller, inserted by [`require_user`]
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Caller if a valid token was sent, inserted by [`optional_user`]
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<User>);

/// Middleware that requires a valid bearer token
pub async fn require_user<U>(
    State(state): State<AuthMiddlewareState<U>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
{
    let token = extract_bearer(req.headers());

    let use_case = CurrentUserUseCase::new(state.repo.clone(), state.tokens.clone());
    let user = use_case.require(token.as_deref()).await?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

/// Middleware that resolves the caller when possible but never rejects
/// for a missing or invalid token
pub async fn optional_user<U>(
    State(state): State<AuthMiddlewareState<U>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
{
    let token = extract_bearer(req.headers());

    let use_case = CurrentUserUseCase::new(state.repo.clone(), state.tokens.clone());
    let viewer = use_case.optional(token.as_deref()).await?;

    req.extensions_mut().insert(Viewer(viewer));

    Ok(next.run(req).await)
}
