//! Domain Value Objects
//!
//! Immutable value types for the artwork domain.

use platform::crypto::from_base64;

use crate::error::{ArtworkError, ArtworkResult};

/// Rating score in 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Score(u8);

impl Score {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> ArtworkResult<Self> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ArtworkError::InvalidScore)
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl From<Score> for i32 {
    fn from(score: Score) -> Self {
        i32::from(score.0)
    }
}

/// Where the image of a new artwork comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Decoded `data:image/...;base64,` payload
    Inline { content_type: String, bytes: Vec<u8> },
    /// `http(s)://` URL
    Remote(String),
    /// Nothing supplied: generate from the prompt or use the placeholder
    Absent,
}

impl ImageSource {
    /// Classify the `imagen` field of a create request
    pub fn parse(raw: Option<&str>) -> ArtworkResult<Self> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self::Absent);
        };

        if raw.starts_with("data:") {
            return Self::parse_data_url(raw);
        }

        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(Self::Remote(raw.to_string()));
        }

        Err(ArtworkError::InvalidImage(
            "La imagen debe ser una URL o un data URL en base64".into(),
        ))
    }

    fn parse_data_url(raw: &str) -> ArtworkResult<Self> {
        let invalid = || ArtworkError::InvalidImage("Imagen en base64 inválida".into());

        let (header, payload) = raw.split_once(',').ok_or_else(invalid)?;
        let media = header
            .strip_prefix("data:")
            .and_then(|h| h.strip_suffix(";base64"))
            .ok_or_else(invalid)?;

        // Parameters such as `;charset=` may sit between the type and `;base64`
        let content_type = media.split(';').next().unwrap_or_default().trim();
        if !content_type.starts_with("image/") || content_type.len() == "image/".len() {
            return Err(invalid());
        }

        let bytes = from_base64(payload.trim()).map_err(|_| invalid())?;
        if bytes.is_empty() {
            return Err(ArtworkError::InvalidImage("La imagen está vacía".into()));
        }

        Ok(Self::Inline {
            content_type: content_type.to_ascii_lowercase(),
            bytes,
        })
    }
}
