mod api;
mod app;
mod auth;
mod config;
mod db;
mod domain;
mod error;
mod logging;
mod middleware;
mod routes;
mod services;

use anyhow::Result;

use auth::TokenService;
use services::{GeminiClient, MediaStore, RedisCache};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = config::Settings::from_env()?;

    // Initialize logging
    logging::init_logging(&settings.env);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        "Starting HeavenKnows backend"
    );

    // Create database pool and apply migrations
    let pool = db::create_pool(&settings).await?;
    db::run_migrations(&pool).await?;
    db::ensure_admin_account(&pool, &settings).await?;

    // Create Redis cache
    let cache = RedisCache::new(&settings.redis_url, settings.redis_cache_ttl_seconds).await?;
    tracing::info!("Redis cache initialized");

    // Create the Gemini client
    let ai_client = GeminiClient::new(
        &settings.gemini_api_base,
        &settings.gemini_model,
        settings.gemini_api_key.clone(),
        settings.gemini_timeout_seconds,
    )?;
    if !ai_client.is_configured() {
        tracing::warn!("GEMINI_API_KEY not set - itinerary generation will be unavailable");
    }

    // Token service for issuing and verifying access tokens
    let tokens = TokenService::new(
        &settings.jwt_secret,
        settings.jwt_issuer.clone(),
        settings.jwt_audience.clone(),
        settings.jwt_ttl_seconds,
    );

    // Media storage for uploads
    let media = MediaStore::new(&settings.media_root);

    // Create application state
    let state = app::AppState::new(pool, settings.clone(), tokens, cache, ai_client, media);

    // Build application
    let app = app::create_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
