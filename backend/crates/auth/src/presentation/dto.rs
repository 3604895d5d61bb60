//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::domain::entity::user::User;

// ============================================================================
// Register
// ============================================================================

/// POST /usuarios/registrar
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub user_name: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub mensaje: String,
    pub id: String,
}

// ============================================================================
// Login
// ============================================================================

/// POST /usuarios/login
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// `?email=` form of the login request, kept for older clients
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginQuery {
    pub email: Option<String>,
}

/// Public projection of a user
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub user_name: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id.to_string(),
            email: user.email.as_str().to_string(),
            user_name: user.display_name.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

// ============================================================================
// Google Login
// ============================================================================

/// POST /usuarios/google-login
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleLoginRequest {
    /// Google ID token from the Sign-In With Google button
    pub credential: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleUserResponse {
    pub id: String,
    pub email: String,
    pub user_name: String,
    pub picture: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoogleLoginResponse {
    pub token: String,
    pub user: GoogleUserResponse,
}
