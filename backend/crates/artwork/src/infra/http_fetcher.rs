//! HTTP image download

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};

use crate::domain::services::{FetchedImage, ImageFetcher};
use crate::error::{ArtworkError, ArtworkResult};

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Downloads images with `reqwest`
pub struct HttpImageFetcher {
    http: reqwest::Client,
}

impl Default for HttpImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpImageFetcher {
    pub fn new() -> Self {
        Self {
            http: super::http_client(DOWNLOAD_TIMEOUT),
        }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str, max_bytes: usize) -> ArtworkResult<FetchedImage> {
        let mut response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ArtworkError::ImageDownload(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArtworkError::ImageDownload(format!("status {}", status)));
        }

        let declared = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());
        if declared.is_some_and(|len| len > max_bytes) {
            return Err(ArtworkError::ImageDownload("image too large".into()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().to_ascii_lowercase())
            .filter(|v| v.starts_with("image/"))
            .unwrap_or_else(|| "image/jpeg".to_string());

        let mut bytes = Vec::with_capacity(declared.unwrap_or(0));
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ArtworkError::ImageDownload(e.to_string()))?
        {
            if bytes.len() + chunk.len() > max_bytes {
                return Err(ArtworkError::ImageDownload("image too large".into()));
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(FetchedImage {
            bytes,
            content_type,
        })
    }
}
