//! Local filesystem image store
//!
//! Writes `obra_<uuid>.<ext>` files into a directory that the API serves
//! under `/imagenes`.

use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::services::{ImageStore, extension_for};
use crate::error::{ArtworkError, ArtworkResult};

pub struct LocalImageStore {
    dir: PathBuf,
    /// `{PUBLIC_BASE_URL}/imagenes/`
    public_prefix: String,
}

impl LocalImageStore {
    pub fn new(dir: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            dir: dir.into(),
            public_prefix: format!("{}/imagenes/", public_base_url.trim_end_matches('/')),
        }
    }

    /// File name inside the store for an owned URL
    fn file_name<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(&self.public_prefix)
            .filter(|name| {
                !name.is_empty()
                    && !name.starts_with('.')
                    && !name.contains(['/', '\\'])
            })
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> ArtworkResult<String> {
        let file_name = format!("obra_{}.{}", Uuid::new_v4(), extension_for(content_type));

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ArtworkError::Upstream(format!("image directory: {}", e)))?;
        tokio::fs::write(self.dir.join(&file_name), &bytes)
            .await
            .map_err(|e| ArtworkError::Upstream(format!("image write: {}", e)))?;

        tracing::debug!(file = %file_name, size = bytes.len(), "Image stored locally");
        Ok(format!("{}{}", self.public_prefix, file_name))
    }

    fn owns(&self, url: &str) -> bool {
        self.file_name(url).is_some()
    }

    async fn contains(&self, url: &str) -> ArtworkResult<bool> {
        let Some(name) = self.file_name(url) else {
            return Ok(false);
        };
        Ok(tokio::fs::try_exists(self.dir.join(name))
            .await
            .unwrap_or(false))
    }
}
