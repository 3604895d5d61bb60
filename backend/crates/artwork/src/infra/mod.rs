//! Infrastructure Layer
//!
//! Database repositories and clients for external image services.

pub mod cloudinary;
pub mod horde;
pub mod http_fetcher;
pub mod local_store;
pub mod memory;
pub mod postgres;

use std::time::Duration;

pub use cloudinary::CloudinaryImageStore;
pub use horde::HordeImageGenerator;
pub use http_fetcher::HttpImageFetcher;
pub use local_store::LocalImageStore;
pub use memory::MemoryArtworkRepository;
pub use postgres::PgArtworkRepository;

/// Outbound HTTP client shared by the image service clients
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!("artwork/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}
