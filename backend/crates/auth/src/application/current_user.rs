//! Current User Use Case
//!
//! Resolves a bearer token to a stored user, in a mandatory and an optional
//! flavour.

use std::sync::Arc;

use crate::application::token::TokenService;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

/// Current user use case
pub struct CurrentUserUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    tokens: Arc<TokenService>,
}

impl<U> CurrentUserUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, tokens: Arc<TokenService>) -> Self {
        Self { user_repo, tokens }
    }

    /// Token required
    ///
    /// Missing or invalid token is `InvalidToken`; a valid token for an email
    /// with no row is `UserNotFound`.
    pub async fn require(&self, token: Option<&str>) -> AuthResult<User> {
        let token = token.ok_or(AuthError::InvalidToken)?;
        let claims = self.tokens.verify(token)?;
        let email = Email::new(claims.subject()).map_err(|_| AuthError::InvalidToken)?;

        self.user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Token optional
    ///
    /// Any token problem yields `Ok(None)`. Store failures are still errors.
    pub async fn optional(&self, token: Option<&str>) -> AuthResult<Option<User>> {
        let Some(token) = token else {
            return Ok(None);
        };

        let email = match self
            .tokens
            .verify(token)
            .ok()
            .and_then(|claims| Email::new(claims.subject()).ok())
        {
            Some(email) => email,
            None => {
                tracing::debug!("Ignoring invalid optional bearer token");
                return Ok(None);
            }
        };

        self.user_repo.find_by_email(&email).await
    }
}
