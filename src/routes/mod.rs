pub mod catalog;
pub mod health;

use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::error::CatalogError;
use crate::AppState;

/// Seconds a client should wait before retrying a not-ready catalog
const RETRY_AFTER_SECS: &str = "5";

pub type ApiError = (StatusCode, HeaderMap, Json<serde_json::Value>);

/// Map a catalog error to an HTTP status and `{"error": message}` body
pub fn error_response(err: CatalogError) -> ApiError {
    let mut headers = HeaderMap::new();

    if err.is_retryable() {
        headers.insert(header::RETRY_AFTER, HeaderValue::from_static(RETRY_AFTER_SECS));
    }

    let status = match &err {
        CatalogError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
        CatalogError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
        _ => {
            tracing::error!(error = %err, "Catalog request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (status, headers, Json(serde_json::json!({ "error": err.to_string() })))
}

/// Build the HTTP router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health endpoints
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready))
        .route("/live", get(health::live))
        // Catalog endpoints
        .route("/api/catalog/:kind", get(catalog::list_catalog))
        .route("/api/series/:name/episodes", get(catalog::get_series_episodes))
        .route("/api/search/:term", get(catalog::search_catalog))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
