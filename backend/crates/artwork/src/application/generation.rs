//! Image Generation Polling
//!
//! Drives an external generation job to completion as an explicit state
//! machine:
//!
//! ```text
//! Submitted ──> Polling(0) ──> Polling(1) ──> ... ──> Done
//!                   │               │                  Faulted
//!                   └───────────────┴────────────────> Exhausted
//! ```
//!
//! Polling uses a fixed interval and a fixed attempt budget.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::services::{ImageGenerator, JobStatus};
use crate::error::{ArtworkError, ArtworkResult};

/// Generation job state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationState {
    Submitted { job: String },
    /// `attempt` status checks have been made so far
    Polling { job: String, attempt: u32 },
    Done { image_url: String },
    Faulted { job: String, reason: String },
    Exhausted { job: String, attempts: u32 },
}

impl GenerationState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GenerationState::Done { .. }
                | GenerationState::Faulted { .. }
                | GenerationState::Exhausted { .. }
        )
    }
}

/// Runs generation jobs against an [`ImageGenerator`]
#[derive(Clone)]
pub struct GenerationPoller {
    generator: Arc<dyn ImageGenerator>,
    interval: Duration,
    max_attempts: u32,
}

impl GenerationPoller {
    pub fn new(generator: Arc<dyn ImageGenerator>, interval: Duration, max_attempts: u32) -> Self {
        Self {
            generator,
            interval,
            max_attempts,
        }
    }

    /// Submit a job for `prompt`
    pub async fn start(&self, prompt: &str) -> ArtworkResult<GenerationState> {
        let job = self.generator.submit(prompt).await?;
        tracing::debug!(job = %job, "Generation job submitted");
        Ok(GenerationState::Submitted { job })
    }

    /// Advance one transition
    ///
    /// Terminal states are returned unchanged. A transport error while
    /// checking the job is returned as `Err`.
    pub async fn step(&self, state: GenerationState) -> ArtworkResult<GenerationState> {
        match state {
            GenerationState::Submitted { job } => Ok(GenerationState::Polling { job, attempt: 0 }),
            GenerationState::Polling { job, attempt } => {
                if attempt >= self.max_attempts {
                    return Ok(GenerationState::Exhausted {
                        job,
                        attempts: attempt,
                    });
                }

                tokio::time::sleep(self.interval).await;

                Ok(match self.generator.check(&job).await? {
                    JobStatus::Pending => GenerationState::Polling {
                        job,
                        attempt: attempt + 1,
                    },
                    JobStatus::Done { image_url } => GenerationState::Done { image_url },
                    JobStatus::Faulted { reason } => GenerationState::Faulted { job, reason },
                })
            }
            terminal => Ok(terminal),
        }
    }

    /// Submit and poll until a terminal state, returning the image URL
    pub async fn run(&self, prompt: &str) -> ArtworkResult<String> {
        let mut state = self.start(prompt).await?;
        while !state.is_terminal() {
            state = self.step(state).await?;
        }

        match state {
            GenerationState::Done { image_url } => {
                tracing::info!("Generation job finished");
                Ok(image_url)
            }
            GenerationState::Faulted { job, reason } => {
                tracing::warn!(job = %job, reason = %reason, "Generation job faulted");
                Err(ArtworkError::Upstream(format!(
                    "la generación falló: {}",
                    reason
                )))
            }
            GenerationState::Exhausted { job, attempts } => {
                tracing::warn!(job = %job, attempts, "Generation job did not finish in time");
                Err(ArtworkError::Upstream(
                    "la generación no terminó a tiempo".into(),
                ))
            }
            GenerationState::Submitted { .. } | GenerationState::Polling { .. } => Err(
                ArtworkError::Internal("generation stopped before a terminal state".into()),
            ),
        }
    }
}
