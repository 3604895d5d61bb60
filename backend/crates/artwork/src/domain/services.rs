//! Domain Services
//!
//! Capabilities the artwork domain depends on but does not implement, plus
//! pure helpers shared by the repositories.

use async_trait::async_trait;

use crate::error::ArtworkResult;

/// Durable image hosting
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store `bytes` and return the public URL
    async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> ArtworkResult<String>;

    /// Whether `url` already points into this store
    fn owns(&self, url: &str) -> bool;

    /// Whether an owned `url` names an image that is actually stored
    async fn contains(&self, _url: &str) -> ArtworkResult<bool> {
        Ok(true)
    }
}

/// Downloaded image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Downloads remote images
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetch `url`, refusing bodies larger than `max_bytes`
    ///
    /// Non-2xx answers, transport failures and oversize bodies all yield
    /// `ArtworkError::ImageDownload`.
    async fn fetch(&self, url: &str, max_bytes: usize) -> ArtworkResult<FetchedImage>;
}

/// State of an external generation job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Done { image_url: String },
    Faulted { reason: String },
}

/// Asynchronous text-to-image API
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Start a job for `prompt` and return its id
    async fn submit(&self, prompt: &str) -> ArtworkResult<String>;

    /// Poll a job once
    async fn check(&self, job_id: &str) -> ArtworkResult<JobStatus>;
}

/// Round a mean score to 2 decimals
pub fn round_average(mean: f64) -> f64 {
    (mean * 100.0).round() / 100.0
}

/// Mean of `scores` rounded to 2 decimals, `None` when empty
pub fn average_score(scores: &[i32]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let sum: i64 = scores.iter().map(|&s| i64::from(s)).sum();
    Some(round_average(sum as f64 / scores.len() as f64))
}

/// File extension for an image content type
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        _ => "jpg",
    }
}
