//! PostgreSQL Repository Implementations
//!
//! `usuarios` may hold rows written before emails were normalized, so
//! lookups compare `lower(email)` against the already lower-cased [`Email`].

use sqlx::PgPool;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    display_name::DisplayName, email::Email, user_id::UserId, user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed user repository (`usuarios`)
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgUserRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO usuarios (id, email, password, "userName")
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user.user_id.to_string())
        .bind(user.email.as_str())
        .bind(user.password.as_ref().map(|p| p.as_phc_string()))
        .bind(user.display_name.as_str())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AuthError::EmailTaken)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password, "userName" AS user_name
            FROM usuarios
            WHERE lower(email) = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM usuarios WHERE lower(email) = $1)",
        )
        .bind(email.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    password: Option<String>,
    user_name: String,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let user_id = self
            .id
            .parse::<UserId>()
            .map_err(|e| AuthError::Internal(format!("Invalid user id: {}", e)))?;

        // A hash we cannot read locks the password login, not the account
        let password = self.password.and_then(|stored| match UserPassword::from_db(stored) {
            Ok(password) => Some(password),
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    error = %e,
                    "Unusable stored password hash, password login disabled"
                );
                None
            }
        });

        Ok(User {
            user_id,
            email: Email::from_db(self.email),
            password,
            display_name: DisplayName::from_db(self.user_name),
        })
    }
}
