use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{error_response, ApiError};
use crate::AppState;

/// Raw pagination params; parsed leniently by the query façade
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// GET /api/catalog/:kind - Paginated movies, channels or series
pub async fn list_catalog(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .query
        .list(&kind, params.page.as_deref(), params.limit.as_deref())
        .await
        .map_err(error_response)?;

    Ok(Json(page))
}

/// GET /api/series/:name/episodes - Ordered episodes of one series
pub async fn get_series_episodes(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    match state.query.series_episodes(&name).await.map_err(error_response)? {
        Some(episodes) => Ok(Json(episodes)),
        None => Err((
            StatusCode::NOT_FOUND,
            HeaderMap::new(),
            Json(serde_json::json!({ "error": "Série não encontrada" })),
        )),
    }
}

/// GET /api/search/:term - Channels, movies and series matching a term
pub async fn search_catalog(
    State(state): State<Arc<AppState>>,
    Path(term): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let results = state.query.search(&term).await.map_err(error_response)?;

    Ok(Json(results))
}

#[cfg(test)]
mod tests {
    use axum::http::{header, StatusCode};

    use crate::routes::tests::{get_json, test_app};
    use crate::services::catalog_store::tests::sample_catalog;

    #[tokio::test]
    async fn test_list_catalog_page() {
        let (_dir, app) = test_app(Some(sample_catalog(25))).await;

        let (status, _, body) = get_json(app, "/api/catalog/movie?page=2&limit=10").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"], 2);
        assert_eq!(body["totalPages"], 3);
        assert_eq!(body["totalItems"], 25);
        assert_eq!(body["items"].as_array().unwrap().len(), 10);
        assert_eq!(body["items"][0]["kind"], "movie");
        assert_eq!(body["items"][0]["name"], "Movie 11");
        assert_eq!(body["items"][0]["mediaUrl"], "http://h/movie/11.mp4");
    }

    #[tokio::test]
    async fn test_list_series_summaries() {
        let (_dir, app) = test_app(Some(sample_catalog(0))).await;

        let (status, _, body) = get_json(app, "/api/catalog/series").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalItems"], 2);
        assert_eq!(body["items"][0]["name"], "Dark");
        assert_eq!(body["items"][0]["episodes"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_list_unknown_kind_is_bad_request() {
        let (_dir, app) = test_app(Some(sample_catalog(1))).await;

        let (status, _, body) = get_json(app, "/api/catalog/podcasts").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("podcasts"));
    }

    #[tokio::test]
    async fn test_not_ready_is_service_unavailable() {
        let (_dir, app) = test_app(None).await;

        let (status, headers, body) = get_json(app, "/api/catalog/movie").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(headers.contains_key(header::RETRY_AFTER));
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_series_episodes() {
        let (_dir, app) = test_app(Some(sample_catalog(0))).await;

        let (status, _, body) = get_json(app.clone(), "/api/series/The%20Office/episodes").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["seriesName"], "The Office");
        assert_eq!(body[0]["season"], "2");
        assert_eq!(body[0]["episode"], "5");

        let (status, _, body) = get_json(app, "/api/series/Nothing/episodes").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_search_catalog() {
        let (_dir, app) = test_app(Some(sample_catalog(3))).await;

        let (status, _, body) = get_json(app.clone(), "/api/search/dark").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["series"][0]["name"], "Dark");
        assert_eq!(body["series"][0]["episodes"].as_array().unwrap().len(), 1);

        let (status, _, body) = get_json(app, "/api/search/nada").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({ "channels": [], "movies": [], "series": [] })
        );
    }
}
