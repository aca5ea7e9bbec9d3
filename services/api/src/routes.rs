//! API service routes

use axum::{
    Json, Router,
    body::Body,
    extract::{Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use common::{
    feeds::SearchQuery,
    models::{CombinedFeed, NewsItem},
};
use serde_json::json;
use tracing::{error, warn};

use crate::{
    error::{ApiError, ApiResult},
    models::{LatestFeedParams, MediaProxyParams},
    state::AppState,
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/daily-feed", get(daily_feed).options(preflight))
        .route("/latest-feed", get(latest_feed).options(preflight))
        .route("/media-proxy", get(media_proxy).options(preflight))
        .route("/feeds", get(combined_feed).options(preflight))
        // Legacy paths still used by existing browser clients
        .route("/api/nasa-apod", get(daily_feed).options(preflight))
        .route("/api/nasa-news-translated", get(latest_feed).options(preflight))
        .route("/api/image-proxy", get(media_proxy).options(preflight))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "astro-feed"
    }))
}

/// Cross-origin preflight: empty 200
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Picture of the day as one normalized item
pub async fn daily_feed(State(state): State<AppState>) -> ApiResult<Json<NewsItem>> {
    let item = state.feeds.daily_feed().await.map_err(|e| {
        error!("Failed to fetch the picture of the day: {}", e);
        ApiError::Upstream("Failed to fetch the picture of the day.".to_string())
    })?;

    Ok(Json(item))
}

/// Latest library items, newest first
pub async fn latest_feed(
    State(state): State<AppState>,
    params: Result<Query<LatestFeedParams>, QueryRejection>,
) -> ApiResult<Json<Vec<NewsItem>>> {
    let Query(params) = params?;
    let query = SearchQuery::from(params);
    let items = state.feeds.latest_feed(&query).await.map_err(|e| {
        error!("Failed to fetch latest NASA news: {}", e);
        ApiError::Upstream("Failed to fetch NASA news.".to_string())
    })?;

    Ok(Json(items))
}

/// Daily and latest feeds in one response
pub async fn combined_feed(
    State(state): State<AppState>,
    params: Result<Query<LatestFeedParams>, QueryRejection>,
) -> ApiResult<Json<CombinedFeed>> {
    let Query(params) = params?;
    let query = SearchQuery::from(params);
    let feed = state.feeds.combined_feed(&query).await.map_err(|e| {
        error!("Failed to fetch combined feed: {}", e);
        ApiError::Upstream("Failed to fetch NASA news.".to_string())
    })?;

    Ok(Json(feed))
}

/// Stream remote media with its content type and a long-lived cache policy
pub async fn media_proxy(
    State(state): State<AppState>,
    params: Result<Query<MediaProxyParams>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(params) = params?;
    let media = state
        .media_proxy
        .fetch(params.url.as_deref())
        .await
        .map_err(|e| {
            if e.is_client_error() {
                warn!("Rejected media proxy request: {}", e);
            } else {
                error!("Media proxy failed for {:?}: {}", params.url, e);
            }
            ApiError::from(e)
        })?;

    let headers = [
        (header::CONTENT_TYPE, media.content_type().to_string()),
        (header::CACHE_CONTROL, media.cache_control().to_string()),
    ];

    Ok((headers, Body::from_stream(media.into_stream())).into_response())
}
