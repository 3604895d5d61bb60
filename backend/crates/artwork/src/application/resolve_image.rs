//! Image Resolution
//!
//! Turns the `imagen` field of a create request into a stored image URL.

use std::sync::Arc;

use crate::application::config::ArtworkConfig;
use crate::application::generation::GenerationPoller;
use crate::domain::services::{ImageFetcher, ImageStore};
use crate::domain::value_objects::ImageSource;
use crate::error::{ArtworkError, ArtworkResult};

/// Resolves an [`ImageSource`] to a URL in the image store
#[derive(Clone)]
pub struct ImageResolver {
    store: Arc<dyn ImageStore>,
    fetcher: Arc<dyn ImageFetcher>,
    /// `None` when no generation API is configured
    generator: Option<GenerationPoller>,
    config: Arc<ArtworkConfig>,
}

impl ImageResolver {
    pub fn new(
        store: Arc<dyn ImageStore>,
        fetcher: Arc<dyn ImageFetcher>,
        generator: Option<GenerationPoller>,
        config: Arc<ArtworkConfig>,
    ) -> Self {
        Self {
            store,
            fetcher,
            generator,
            config,
        }
    }

    pub fn config(&self) -> &ArtworkConfig {
        &self.config
    }

    pub async fn resolve(&self, source: ImageSource, prompt: &str) -> ArtworkResult<String> {
        match source {
            ImageSource::Inline {
                content_type,
                bytes,
            } => {
                self.check_size(bytes.len())?;
                self.store.upload(bytes, &content_type).await
            }
            ImageSource::Remote(url) => {
                if self.store.owns(&url) {
                    if !self.store.contains(&url).await? {
                        return Err(ArtworkError::StoredImageNotFound);
                    }
                    return Ok(url);
                }
                let image = self.fetcher.fetch(&url, self.config.max_image_bytes).await?;
                if image.bytes.is_empty() {
                    return Err(ArtworkError::ImageDownload("empty body".into()));
                }
                self.store.upload(image.bytes, &image.content_type).await
            }
            ImageSource::Absent => match &self.generator {
                Some(poller) => self.generate(poller, prompt).await,
                None => Ok(self.config.placeholder_image_url.clone()),
            },
        }
    }

    async fn generate(&self, poller: &GenerationPoller, prompt: &str) -> ArtworkResult<String> {
        let generated = poller.run(prompt).await?;

        // The generator's URL is ours to fetch; a failure here is upstream
        let image = self
            .fetcher
            .fetch(&generated, self.config.max_image_bytes)
            .await
            .map_err(|e| match e {
                ArtworkError::ImageDownload(reason) => {
                    ArtworkError::Upstream(format!("imagen generada no disponible: {}", reason))
                }
                other => other,
            })?;

        self.store.upload(image.bytes, &image.content_type).await
    }

    fn check_size(&self, len: usize) -> ArtworkResult<()> {
        if len > self.config.max_image_bytes {
            return Err(ArtworkError::InvalidImage(format!(
                "La imagen supera el tamaño máximo de {} bytes",
                self.config.max_image_bytes
            )));
        }
        Ok(())
    }
}
