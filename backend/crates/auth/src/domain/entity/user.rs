//! User Entity
//!
//! A row of `usuarios`. Local accounts carry a password hash; accounts
//! created through Google login do not.

use crate::domain::value_object::{
    display_name::DisplayName, email::Email, user_id::UserId, user_password::UserPassword,
};

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    /// Login identifier and token subject (unique)
    pub email: Email,
    /// `None` for OAuth-only accounts
    pub password: Option<UserPassword>,
    pub display_name: DisplayName,
}

impl User {
    /// Create a local account
    pub fn new_local(email: Email, display_name: DisplayName, password: UserPassword) -> Self {
        Self {
            user_id: UserId::new(),
            email,
            password: Some(password),
            display_name,
        }
    }

    /// Create an account from a verified external identity
    pub fn new_external(email: Email, display_name: DisplayName) -> Self {
        Self {
            user_id: UserId::new(),
            email,
            password: None,
            display_name,
        }
    }

    pub fn has_local_password(&self) -> bool {
        self.password.is_some()
    }
}
