//! Cloudinary image store
//!
//! Signed uploads through the REST upload API. The signature is the SHA-1
//! hex digest of the alphabetically sorted parameters followed by the API
//! secret.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use platform::crypto::{sha1_hex, to_base64};
use serde::Deserialize;

use crate::domain::services::ImageStore;
use crate::error::{ArtworkError, ArtworkResult};

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Cloudinary account credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudinaryCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl CloudinaryCredentials {
    /// Parse `cloudinary://<api_key>:<api_secret>@<cloud_name>`
    pub fn from_url(url: &str) -> Option<Self> {
        let rest = url.trim().strip_prefix("cloudinary://")?;
        let (auth, cloud_name) = rest.rsplit_once('@')?;
        let (api_key, api_secret) = auth.split_once(':')?;
        let cloud_name = cloud_name.trim_end_matches('/');

        if api_key.is_empty() || api_secret.is_empty() || cloud_name.is_empty() {
            return None;
        }

        Some(Self {
            cloud_name: cloud_name.to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
        })
    }
}

/// Image store backed by a Cloudinary account
pub struct CloudinaryImageStore {
    credentials: CloudinaryCredentials,
    folder: Option<String>,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl CloudinaryImageStore {
    pub fn new(credentials: CloudinaryCredentials, folder: Option<String>) -> Self {
        Self {
            credentials,
            folder,
            http: super::http_client(UPLOAD_TIMEOUT),
        }
    }

    fn upload_url(&self) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.credentials.cloud_name
        )
    }

    fn delivery_prefix(&self) -> String {
        format!("https://res.cloudinary.com/{}/", self.credentials.cloud_name)
    }

    /// Signed parameters for an upload at `timestamp`, `file` excluded
    fn signed_params(&self, timestamp: i64) -> Vec<(&'static str, String)> {
        let mut params = vec![("timestamp", timestamp.to_string())];
        if let Some(folder) = &self.folder {
            params.push(("folder", folder.clone()));
        }
        params.sort_by(|a, b| a.0.cmp(b.0));

        let signature = sign(&params, &self.credentials.api_secret);
        params.push(("api_key", self.credentials.api_key.clone()));
        params.push(("signature", signature));
        params
    }
}

/// `sha1("k1=v1&k2=v2" + secret)` over params already sorted by key
pub fn sign(sorted_params: &[(&str, String)], api_secret: &str) -> String {
    let joined = sorted_params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");
    sha1_hex(format!("{}{}", joined, api_secret).as_bytes())
}

#[async_trait]
impl ImageStore for CloudinaryImageStore {
    async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> ArtworkResult<String> {
        let mut form = self.signed_params(Utc::now().timestamp());
        form.push((
            "file",
            format!("data:{};base64,{}", content_type, to_base64(&bytes)),
        ));

        let response = self
            .http
            .post(self.upload_url())
            .form(&form)
            .send()
            .await
            .map_err(|e| ArtworkError::Upstream(format!("Cloudinary: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ArtworkError::Upstream(format!(
                "Cloudinary returned {}: {}",
                status, body
            )));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| ArtworkError::Upstream(format!("Cloudinary response: {}", e)))?;

        tracing::debug!(url = %uploaded.secure_url, "Image uploaded to Cloudinary");
        Ok(uploaded.secure_url)
    }

    fn owns(&self, url: &str) -> bool {
        url.starts_with(&self.delivery_prefix())
    }
}
