mod cache;
mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod services;
mod storage;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cache::{MemoryCache, PageCache};
use crate::config::Config;
use crate::db::Database;
use crate::services::{validate, TokenVerifier};
use crate::storage::{ObjectStorage, S3Storage};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<Config>,
    pub storage: Arc<dyn ObjectStorage>,
    pub cache: Arc<dyn PageCache>,
    pub verifier: Arc<TokenVerifier>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "filedrop=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting filedrop...");

    // Load configuration
    let config = Config::load()?;
    let config = Arc::new(config);
    tracing::info!("Configuration loaded");

    // Initialize database
    let db = Database::new(&config.database.path).await?;
    db.run_migrations().await?;
    tracing::info!("Database initialized");

    // Object store, listing cache, token verifier
    let storage: Arc<dyn ObjectStorage> = Arc::new(S3Storage::new(&config.storage));
    let cache: Arc<dyn PageCache> = Arc::new(MemoryCache::new(Duration::from_secs(
        config.cache.listing_ttl_secs,
    )));
    let verifier = Arc::new(TokenVerifier::new(&config));

    // Create app state
    let state = AppState {
        db,
        config: config.clone(),
        storage,
        cache,
        verifier,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // All API routes require a verified bearer token
    let api_routes = Router::new()
        .route("/upload", post(handlers::file::upload_file))
        .route("/files", get(handlers::file::list_files))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    Router::new()
        .nest("/api", api_routes)
        // Body limit sits above the validation ceiling so oversize uploads
        // get the validator's 400, with headroom for multipart framing
        .layer(DefaultBodyLimit::max(validate::MAX_FILE_SIZE + 64 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
