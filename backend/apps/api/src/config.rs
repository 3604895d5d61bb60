//! Server Configuration
//!
//! Built once at startup from the environment (after `.env` is loaded) and
//! handed to the routers by value.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use artwork::{ArtworkConfig, CloudinaryCredentials};
use auth::AuthConfig;

const DEFAULT_ALLOWED_ORIGINS: &str =
    "http://localhost:3000,https://art-ificial-frontend-v2.vercel.app";

/// External generation API settings
#[derive(Debug, Clone)]
pub struct GenerationApiConfig {
    pub api_key: String,
    /// `None` uses the public AI-Horde endpoint
    pub base_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub allowed_origins: Vec<String>,
    /// Public URL of this server, used for locally stored images
    pub public_base_url: String,
    /// Directory served under `/imagenes`
    pub output_dir: PathBuf,
    /// Cloudinary account; images go to `output_dir` when `None`
    pub cloudinary: Option<CloudinaryCredentials>,
    pub generation_api: Option<GenerationApiConfig>,
    pub auth: AuthConfig,
    pub artwork: ArtworkConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let database_url = get("DATABASE_URL").context("DATABASE_URL must be set")?;
        let database_max_connections = parse_or(&get, "DATABASE_MAX_CONNECTIONS", 5)?;
        let bind_addr = parse_or(
            &get,
            "BIND_ADDR",
            SocketAddr::from(([0, 0, 0, 0], 8000)),
        )?;

        let allowed_origins = get("ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        let public_base_url = get("API_BASE_URL")
            .unwrap_or_else(|| "http://localhost:8000".to_string())
            .trim_end_matches('/')
            .to_string();
        let output_dir = PathBuf::from(get("OUTPUT_DIR").unwrap_or_else(|| "output".to_string()));

        let auth = auth_config(&get)?;
        let artwork = artwork_config(&get, &public_base_url)?;

        Ok(Self {
            database_url,
            database_max_connections,
            bind_addr,
            allowed_origins,
            public_base_url,
            output_dir,
            cloudinary: cloudinary_credentials(&get)?,
            generation_api: get("IMAGE_API_KEY").map(|api_key| GenerationApiConfig {
                api_key,
                base_url: get("IMAGE_API_URL"),
            }),
            auth,
            artwork,
        })
    }
}

fn parse_or<T>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {}: {} ({})", key, raw, e)),
        None => Ok(default),
    }
}

fn auth_config(get: &impl Fn(&str) -> Option<String>) -> anyhow::Result<AuthConfig> {
    let defaults = AuthConfig::default();

    let token_algorithm = match get("ALGORITHM") {
        Some(name) => AuthConfig::parse_algorithm(&name)
            .with_context(|| format!("unsupported ALGORITHM: {}", name))?,
        None => defaults.token_algorithm,
    };
    let minutes: u64 = parse_or(get, "EXPIRACION_MINUTOS", 1440)?;

    Ok(AuthConfig {
        token_secret: get("SECRET_KEY").unwrap_or(defaults.token_secret),
        token_algorithm,
        token_ttl: Duration::from_secs(minutes * 60),
        google_client_id: get("GOOGLE_CLIENT_ID"),
        password_pepper: get("PASSWORD_PEPPER").map(String::into_bytes),
    })
}

fn artwork_config(
    get: &impl Fn(&str) -> Option<String>,
    public_base_url: &str,
) -> anyhow::Result<ArtworkConfig> {
    let defaults = ArtworkConfig::with_public_base_url(public_base_url);

    let interval_ms: u64 = parse_or(
        get,
        "IMAGE_POLL_INTERVAL_MS",
        defaults.poll_interval.as_millis() as u64,
    )?;

    Ok(ArtworkConfig {
        max_image_bytes: parse_or(get, "MAX_IMAGE_BYTES", defaults.max_image_bytes)?,
        poll_interval: Duration::from_millis(interval_ms),
        poll_max_attempts: parse_or(get, "IMAGE_POLL_MAX_ATTEMPTS", defaults.poll_max_attempts)?,
        placeholder_image_url: get("PLACEHOLDER_IMAGE_URL")
            .unwrap_or(defaults.placeholder_image_url),
    })
}

fn cloudinary_credentials(
    get: &impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Option<CloudinaryCredentials>> {
    if let Some(url) = get("CLOUDINARY_URL") {
        return CloudinaryCredentials::from_url(&url)
            .map(Some)
            .context("CLOUDINARY_URL must look like cloudinary://<key>:<secret>@<cloud>");
    }

    match (
        get("CLOUDINARY_CLOUD_NAME"),
        get("CLOUDINARY_API_KEY"),
        get("CLOUDINARY_API_SECRET"),
    ) {
        (Some(cloud_name), Some(api_key), Some(api_secret)) => Ok(Some(CloudinaryCredentials {
            cloud_name,
            api_key,
            api_secret,
        })),
        (None, None, None) => Ok(None),
        _ => bail!(
            "CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET must be set together"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("DATABASE_URL", "postgres://localhost/obras")]).unwrap();

        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.bind_addr.port(), 8000);
        assert_eq!(config.allowed_origins.len(), 2);
        assert!(config.auth.uses_development_secret());
        assert_eq!(config.auth.token_ttl, Duration::from_secs(1440 * 60));
        assert!(config.cloudinary.is_none());
        assert!(config.generation_api.is_none());
        assert_eq!(
            config.artwork.placeholder_image_url,
            "http://localhost:8000/imagenes/robot.jpg"
        );
    }

    #[test]
    fn test_database_url_required() {
        assert!(config(&[]).is_err());
        assert!(config(&[("DATABASE_URL", "  ")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("DATABASE_URL", "postgres://db/obras"),
            ("SECRET_KEY", "s3cret"),
            ("ALGORITHM", "HS512"),
            ("EXPIRACION_MINUTOS", "30"),
            ("ALLOWED_ORIGINS", "https://a.example, https://b.example,"),
            ("API_BASE_URL", "https://api.example/"),
            ("CLOUDINARY_URL", "cloudinary://k:s@demo"),
            ("IMAGE_API_KEY", "horde-key"),
            ("IMAGE_POLL_INTERVAL_MS", "500"),
        ])
        .unwrap();

        assert_eq!(config.auth.token_secret, "s3cret");
        assert_eq!(config.auth.token_ttl, Duration::from_secs(30 * 60));
        assert_eq!(config.allowed_origins, ["https://a.example", "https://b.example"]);
        assert_eq!(config.public_base_url, "https://api.example");
        assert_eq!(config.cloudinary.unwrap().cloud_name, "demo");
        assert_eq!(config.generation_api.unwrap().api_key, "horde-key");
        assert_eq!(config.artwork.poll_interval, Duration::from_millis(500));
    }

    #[test]
    fn test_invalid_values() {
        let base = ("DATABASE_URL", "postgres://db/obras");
        assert!(config(&[base, ("ALGORITHM", "RS256")]).is_err());
        assert!(config(&[base, ("EXPIRACION_MINUTOS", "soon")]).is_err());
        assert!(config(&[base, ("CLOUDINARY_CLOUD_NAME", "demo")]).is_err());
    }
}
