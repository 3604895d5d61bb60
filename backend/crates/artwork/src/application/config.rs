//! Application Configuration
//!
//! Configuration for the artwork application layer.

use std::time::Duration;

/// Artwork application configuration
#[derive(Debug, Clone)]
pub struct ArtworkConfig {
    /// Largest accepted image, inline or downloaded
    pub max_image_bytes: usize,
    /// Delay between generation status checks
    pub poll_interval: Duration,
    /// Status checks before a generation job is abandoned
    pub poll_max_attempts: u32,
    /// Image used when no source is given and no generator is configured
    pub placeholder_image_url: String,
}

impl Default for ArtworkConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: 10 * 1024 * 1024,
            poll_interval: Duration::from_secs(2),
            poll_max_attempts: 30,
            placeholder_image_url: "http://localhost:8000/imagenes/robot.jpg".to_string(),
        }
    }
}

/// Room for the `data:` prefix and the other create-request fields
const REQUEST_OVERHEAD_BYTES: usize = 64 * 1024;

impl ArtworkConfig {
    /// Largest create-request body: the image cap in base64 plus the rest
    /// of the JSON
    pub fn max_request_bytes(&self) -> usize {
        self.max_image_bytes
            .div_ceil(3)
            .saturating_mul(4)
            .saturating_add(REQUEST_OVERHEAD_BYTES)
    }

    /// Placeholder served from the local image directory of `public_base_url`
    pub fn with_public_base_url(public_base_url: &str) -> Self {
        Self {
            placeholder_image_url: format!(
                "{}/imagenes/robot.jpg",
                public_base_url.trim_end_matches('/')
            ),
            ..Default::default()
        }
    }
}
