//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod config;

use std::sync::Arc;

use anyhow::Context;
use artwork::{
    ArtworkAppState, CloudinaryImageStore, GenerationPoller, HordeImageGenerator,
    HttpImageFetcher, ImageResolver, ImageStore, LocalImageStore, PgArtworkRepository,
    artwork_router,
};
use auth::{PgUserRepository, auth_router, pg_auth_state};
use axum::{
    Json, Router,
    extract::State,
    http::{self, Method, header},
    routing::get,
};
use kernel::error::app_error::AppResult;
use serde::Serialize;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,artwork=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    if config.auth.uses_development_secret() {
        tracing::warn!("SECRET_KEY is not set, signing tokens with the development secret");
    }
    if config.auth.google_client_id.is_none() {
        tracing::info!("GOOGLE_CLIENT_ID is not set, Google login disabled");
    }

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to the database")?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Auth
    let auth_state = pg_auth_state(PgUserRepository::new(pool.clone()), config.auth.clone());
    let auth_middleware = auth_state.middleware_state();

    // Artworks
    let artwork_state = ArtworkAppState::new(
        PgArtworkRepository::new(pool.clone()),
        image_resolver(&config),
    );

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .route("/health", get(health))
        .with_state(pool)
        .nest("/usuarios", auth_router(auth_state))
        .nest("/obras", artwork_router(artwork_state, auth_middleware))
        .nest_service("/imagenes", ServeDir::new(&config.output_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    tracing::info!("Listening on {}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Image store, downloader and optional generation client from configuration
fn image_resolver(config: &AppConfig) -> ImageResolver {
    let store: Arc<dyn ImageStore> = match &config.cloudinary {
        Some(credentials) => {
            tracing::info!(cloud = %credentials.cloud_name, "Storing images in Cloudinary");
            Arc::new(CloudinaryImageStore::new(
                credentials.clone(),
                Some("obras".to_string()),
            ))
        }
        None => {
            tracing::info!(dir = %config.output_dir.display(), "Storing images on local disk");
            Arc::new(LocalImageStore::new(
                config.output_dir.clone(),
                &config.public_base_url,
            ))
        }
    };

    let generator = config.generation_api.as_ref().map(|api| {
        GenerationPoller::new(
            Arc::new(HordeImageGenerator::new(
                api.base_url.clone(),
                api.api_key.clone(),
            )),
            config.artwork.poll_interval,
            config.artwork.poll_max_attempts,
        )
    });
    if generator.is_none() {
        tracing::info!("IMAGE_API_KEY is not set, using the placeholder image");
    }

    ImageResolver::new(
        store,
        Arc::new(HttpImageFetcher::new()),
        generator,
        Arc::new(config.artwork.clone()),
    )
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// GET /health
async fn health(State(pool): State<PgPool>) -> AppResult<Json<HealthResponse>> {
    sqlx::query("SELECT 1").execute(&pool).await?;
    Ok(Json(HealthResponse { status: "ok" }))
}
