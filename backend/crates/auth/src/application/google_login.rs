//! Google Login Use Case
//!
//! Verifies a Google ID token, finds or creates the matching user and issues
//! a bearer token.

use std::sync::Arc;

use crate::application::token::TokenService;
use crate::domain::entity::user::User;
use crate::domain::identity::IdentityVerifier;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{display_name::DisplayName, email::Email};
use crate::error::{AuthError, AuthResult};

/// Google login output
pub struct GoogleLoginOutput {
    pub token: String,
    pub user: User,
    pub picture: String,
    pub created: bool,
}

/// Google login use case
pub struct GoogleLoginUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    tokens: Arc<TokenService>,
    verifier: Option<Arc<dyn IdentityVerifier>>,
}

impl<U> GoogleLoginUseCase<U>
where
    U: UserRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        tokens: Arc<TokenService>,
        verifier: Option<Arc<dyn IdentityVerifier>>,
    ) -> Self {
        Self {
            user_repo,
            tokens,
            verifier,
        }
    }

    pub async fn execute(&self, credential: &str) -> AuthResult<GoogleLoginOutput> {
        let verifier = self
            .verifier
            .as_ref()
            .ok_or(AuthError::IdentityProviderDisabled)?;

        let claims = verifier.verify(credential.trim()).await?;

        let email = Email::new(&claims.email)
            .map_err(|e| AuthError::InvalidIdentityToken(e.message().to_string()))?;

        let (user, created) = match self.user_repo.find_by_email(&email).await? {
            Some(user) => (user, false),
            None => {
                let display_name =
                    DisplayName::or_fallback(claims.name.as_deref(), email.local_part());
                let user = User::new_external(email.clone(), display_name);

                match self.user_repo.create(&user).await {
                    Ok(()) => (user, true),
                    // Lost a race with a concurrent first login
                    Err(AuthError::EmailTaken) => (
                        self.user_repo
                            .find_by_email(&email)
                            .await?
                            .ok_or(AuthError::UserNotFound)?,
                        false,
                    ),
                    Err(e) => return Err(e),
                }
            }
        };

        let token = self.tokens.issue(&user)?;

        tracing::info!(user_id = %user.user_id, created, "Google login");

        Ok(GoogleLoginOutput {
            token,
            user,
            picture: claims.picture.unwrap_or_default(),
            created,
        })
    }
}
