//! AI-Horde generation client
//!
//! Speaks the asynchronous generation API:
//! `POST /v2/generate/async` starts a job, `GET /v2/generate/check/{id}`
//! reports progress and `GET /v2/generate/status/{id}` returns the images.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::domain::services::{ImageGenerator, JobStatus};
use crate::error::{ArtworkError, ArtworkResult};

pub const DEFAULT_HORDE_URL: &str = "https://aihorde.net/api";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HordeImageGenerator {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct SubmitResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    #[serde(default)]
    done: bool,
    #[serde(default)]
    faulted: bool,
    #[serde(default = "default_true")]
    is_possible: bool,
}

#[derive(Deserialize)]
struct StatusResponse {
    #[serde(default)]
    generations: Vec<Generation>,
}

#[derive(Deserialize)]
struct Generation {
    img: String,
}

fn default_true() -> bool {
    true
}

impl HordeImageGenerator {
    pub fn new(base_url: Option<String>, api_key: String) -> Self {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_HORDE_URL.to_string());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            http: super::http_client(REQUEST_TIMEOUT),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> ArtworkResult<T> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .header("apikey", &self.api_key)
            .send()
            .await
            .map_err(upstream)?;

        if !response.status().is_success() {
            return Err(ArtworkError::Upstream(format!(
                "generation API returned {}",
                response.status()
            )));
        }

        response.json().await.map_err(upstream)
    }
}

fn upstream(e: reqwest::Error) -> ArtworkError {
    ArtworkError::Upstream(format!("generation API: {}", e))
}

/// Map a check answer to a job status, `None` when images must be fetched
fn interpret_check(check: &CheckResponse) -> Option<JobStatus> {
    if check.faulted {
        return Some(JobStatus::Faulted {
            reason: "job faulted".into(),
        });
    }
    if !check.is_possible {
        return Some(JobStatus::Faulted {
            reason: "no worker can serve this request".into(),
        });
    }
    if check.done { None } else { Some(JobStatus::Pending) }
}

#[async_trait]
impl ImageGenerator for HordeImageGenerator {
    async fn submit(&self, prompt: &str) -> ArtworkResult<String> {
        let body = json!({
            "prompt": prompt,
            "params": { "n": 1, "width": 512, "height": 512 },
            "r2": true,
        });

        let response = self
            .http
            .post(format!("{}/v2/generate/async", self.base_url))
            .header("apikey", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(upstream)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ArtworkError::Upstream(format!(
                "generation API returned {}: {}",
                status, body
            )));
        }

        let submitted: SubmitResponse = response.json().await.map_err(upstream)?;
        Ok(submitted.id)
    }

    async fn check(&self, job_id: &str) -> ArtworkResult<JobStatus> {
        let check: CheckResponse = self
            .get_json(&format!("/v2/generate/check/{}", job_id))
            .await?;

        if let Some(status) = interpret_check(&check) {
            return Ok(status);
        }

        let status: StatusResponse = self
            .get_json(&format!("/v2/generate/status/{}", job_id))
            .await?;

        Ok(match status.generations.into_iter().next() {
            Some(generation) => JobStatus::Done {
                image_url: generation.img,
            },
            None => JobStatus::Faulted {
                reason: "job finished without images".into(),
            },
        })
    }
}
