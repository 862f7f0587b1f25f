use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::db;
use crate::services::catalog_store::{ImportStats, StoreState};
use crate::AppState;

/// Root endpoint - basic status
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "Catalog Server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "runtime": "rust"
    }))
}

/// Catalog section of the health report
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CatalogHealth {
    state: StoreState,
    generation: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    counts: Option<ImportStats>,
}

/// Health check response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: String,
    environment: String,
    uptime: u64,
    database: bool,
    catalog: CatalogHealth,
}

/// GET /health - Database and catalog status
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime = state.start_time.elapsed().as_secs();
    let database_ok = db::health_check(&state.pool).await;

    let store_state = state.store.state();
    // Counting would wait on an in-flight import
    let counts = if store_state == StoreState::Ready {
        state.store.stats().await.ok()
    } else {
        None
    };

    let status = if !database_ok {
        "unhealthy"
    } else if store_state == StoreState::Ready {
        "ok"
    } else {
        "degraded" // serving health only, catalog still loading
    };

    Json(HealthResponse {
        status: status.to_string(),
        environment: state.config.node_env.clone(),
        uptime,
        database: database_ok,
        catalog: CatalogHealth {
            state: store_state,
            generation: state.store.generation(),
            counts,
        },
    })
}

/// Readiness probe: ready once a catalog is loaded
pub async fn ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database_ok = db::health_check(&state.pool).await;

    match (database_ok, state.store.state()) {
        (true, StoreState::Ready) => (StatusCode::OK, "ready"),
        (true, StoreState::Importing) => (StatusCode::SERVICE_UNAVAILABLE, "not ready - import in progress"),
        (true, StoreState::Uninitialized) => (StatusCode::SERVICE_UNAVAILABLE, "not ready - catalog not loaded"),
        (false, _) => (StatusCode::SERVICE_UNAVAILABLE, "not ready - database unavailable"),
    }
}

/// Liveness probe
pub async fn live() -> impl IntoResponse {
    (StatusCode::OK, "alive")
}
