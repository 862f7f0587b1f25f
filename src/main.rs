mod config;
mod db;
mod error;
mod models;
mod routes;
mod services;

use sqlx::SqlitePool;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::services::{
    catalog_query::{CatalogQuery, QueryLimits},
    catalog_store::CatalogStore,
    ingest::{start_ingestion_task, IngestConfig},
};

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub pool: SqlitePool,
    pub store: Arc<CatalogStore>,
    pub query: CatalogQuery,
    pub start_time: Instant,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = Config::from_env();
    let port = config.port;

    tracing::info!("Starting Catalog Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.node_env);

    // Initialize SQLite connection pool
    let pool = create_pool(&config).await?;
    tracing::info!("SQLite connected");

    // Run database migrations
    run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    let store = Arc::new(CatalogStore::open(pool.clone()).await?);
    let query = CatalogQuery::new(store.clone(), QueryLimits::from(&config));

    // Import runs in the background; queries answer 503 until it commits
    tokio::spawn(start_ingestion_task(store.clone(), IngestConfig::from(&config)));
    tracing::info!("Catalog ingestion started");

    // Build application state
    let state = Arc::new(AppState {
        config,
        pool,
        store,
        query,
        start_time: Instant::now(),
    });

    let app = routes::router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
