//! HTTP Handlers

use axum::Json;
use axum::extract::{Query, State};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    GoogleLoginUseCase, LoginInput, LoginUseCase, RegisterInput, RegisterUseCase, TokenService,
};
use crate::domain::identity::IdentityVerifier;
use crate::domain::repository::UserRepository;
use crate::error::AuthResult;
use crate::presentation::dto::{
    GoogleLoginRequest, GoogleLoginResponse, GoogleUserResponse, LoginQuery, LoginRequest,
    LoginResponse, RegisterRequest, RegisterResponse, UserResponse,
};
use crate::presentation::middleware::AuthMiddlewareState;

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<U>
where
    U: UserRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<U>,
    pub config: Arc<AuthConfig>,
    pub tokens: Arc<TokenService>,
    /// Google ID token verifier; `None` disables `/google-login`
    pub identity: Option<Arc<dyn IdentityVerifier>>,
}

impl<U> AuthAppState<U>
where
    U: UserRepository + Clone + Send + Sync + 'static,
{
    pub fn new(repo: U, config: AuthConfig, identity: Option<Arc<dyn IdentityVerifier>>) -> Self {
        let tokens = Arc::new(TokenService::new(&config));
        Self {
            repo: Arc::new(repo),
            config: Arc::new(config),
            tokens,
            identity,
        }
    }

    /// State for the bearer-token middleware used by other routers
    pub fn middleware_state(&self) -> AuthMiddlewareState<U> {
        AuthMiddlewareState {
            repo: self.repo.clone(),
            tokens: self.tokens.clone(),
        }
    }
}

// ============================================================================
// Register
// ============================================================================

/// POST /usuarios/registrar
pub async fn register<U>(
    State(state): State<AuthAppState<U>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<Json<RegisterResponse>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(RegisterInput {
            email: req.email,
            user_name: req.user_name,
            password: req.password,
        })
        .await?;

    Ok(Json(RegisterResponse {
        mensaje: "Usuario registrado con éxito".to_string(),
        id: output.user_id.to_string(),
    }))
}

// ============================================================================
// Login
// ============================================================================

/// POST /usuarios/login
///
/// The email may come in the JSON body or as `?email=`; the body wins.
pub async fn login<U>(
    State(state): State<AuthAppState<U>>,
    Query(query): Query<LoginQuery>,
    body: Option<Json<LoginRequest>>,
) -> AuthResult<Json<LoginResponse>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
{
    let req = body.map(|Json(req)| req).unwrap_or_default();

    let use_case = LoginUseCase::new(
        state.repo.clone(),
        state.tokens.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(LoginInput {
            email: req.email.or(query.email).unwrap_or_default(),
            password: req.password,
        })
        .await?;

    Ok(Json(LoginResponse {
        token: output.token,
        user: UserResponse::from(&output.user),
    }))
}

// ============================================================================
// Google Login
// ============================================================================

/// POST /usuarios/google-login
pub async fn google_login<U>(
    State(state): State<AuthAppState<U>>,
    Json(req): Json<GoogleLoginRequest>,
) -> AuthResult<Json<GoogleLoginResponse>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
{
    let use_case = GoogleLoginUseCase::new(
        state.repo.clone(),
        state.tokens.clone(),
        state.identity.clone(),
    );

    let output = use_case.execute(&req.credential).await?;
    let user = UserResponse::from(&output.user);

    Ok(Json(GoogleLoginResponse {
        token: output.token,
        user: GoogleUserResponse {
            id: user.id,
            email: user.email,
            user_name: user.user_name,
            picture: output.picture,
        },
    }))
}
