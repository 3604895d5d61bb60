//! Display Name Value Object
//!
//! 公開表示名（`usuarios."userName"`）。ログインには使用しないため一意性は不要。
//!
//! ## 不変条件
//! - NFKC 正規化・前後の空白除去後に 1〜50 文字
//! - 制御文字を含まない

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

/// Maximum length for display name (in characters)
pub const DISPLAY_NAME_MAX_LENGTH: usize = 50;

/// Error returned when display name validation fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayNameError {
    Empty,
    TooLong { length: usize, max: usize },
    ControlCharacter,
}

impl fmt::Display for DisplayNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "El nombre de usuario es obligatorio"),
            Self::TooLong { length, max } => write!(
                f,
                "El nombre de usuario es demasiado largo ({length} caracteres, máximo {max})"
            ),
            Self::ControlCharacter => {
                write!(f, "El nombre de usuario contiene caracteres no permitidos")
            }
        }
    }
}

impl std::error::Error for DisplayNameError {}

/// Validated display name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, DisplayNameError> {
        let normalized: String = raw.as_ref().nfkc().collect();
        let trimmed = normalized.trim();

        if trimmed.is_empty() {
            return Err(DisplayNameError::Empty);
        }

        let length = trimmed.chars().count();
        if length > DISPLAY_NAME_MAX_LENGTH {
            return Err(DisplayNameError::TooLong {
                length,
                max: DISPLAY_NAME_MAX_LENGTH,
            });
        }

        if trimmed.chars().any(char::is_control) {
            return Err(DisplayNameError::ControlCharacter);
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Google profiles may omit `name`; fall back to the email local part.
    pub fn or_fallback(raw: Option<&str>, fallback: &str) -> Self {
        raw.and_then(|name| Self::new(name).ok())
            .or_else(|| Self::new(fallback).ok())
            .unwrap_or_else(|| Self("artista".to_string()))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = DisplayNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DisplayName> for String {
    fn from(name: DisplayName) -> Self {
        name.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
