//! Integration tests for the feed pipeline
//!
//! These tests run the real HTTP code paths against an in-process stub of
//! the NASA and DeepL upstreams bound to an ephemeral local port.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    body::Body,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use common::{
    error::{ProxyError, UpstreamError},
    feeds::{FeedEndpoints, FeedService, SearchQuery},
    media_resolver::MediaResolver,
    models::MediaType,
    normalizer::{Normalizer, UNKNOWN_DATE},
    proxy::{CACHE_CONTROL_POLICY, DEFAULT_CONTENT_TYPE, MediaProxy},
    translation::{DeepLTranslator, TranslationAdapter},
};
use futures::TryStreamExt;
use serde_json::{Value, json};
use tokio::net::TcpListener;

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot really a png";

#[derive(Default)]
struct Upstream {
    base_url: String,
    search_queries: Mutex<Vec<HashMap<String, String>>>,
}

async fn apod(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    if params.get("api_key").map(String::as_str) != Some("test-key") {
        return (StatusCode::FORBIDDEN, Json(json!({"error": "bad key"})));
    }
    (
        StatusCode::OK,
        Json(json!({
            "title": "Moon",
            "explanation": "A bright moon.",
            "date": "2024-05-10",
            "url": "http://x/img.jpg",
            "media_type": "image",
            "service_version": "v1"
        })),
    )
}

async fn search(
    State(upstream): State<Arc<Upstream>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    upstream.search_queries.lock().unwrap().push(params);
    let base = &upstream.base_url;

    Json(json!({
        "collection": {
            "version": "1.0",
            "items": [
                {
                    "href": format!("{base}/assets/undated/collection.json"),
                    "data": [{ "nasa_id": "undated", "title": "Undated", "media_type": "image" }],
                    "links": []
                },
                {
                    "href": format!("{base}/assets/image-1/collection.json"),
                    "data": [{
                        "nasa_id": "image-1",
                        "title": "Nebula",
                        "description": "Gas and dust.",
                        "date_created": "2024-01-01T00:00:00Z",
                        "media_type": "image"
                    }],
                    "links": [
                        { "href": "https://images-assets.nasa.gov/image/image-1/image-1~orig.jpg", "rel": "canonical" },
                        { "href": "https://images-assets.nasa.gov/image/image-1/image-1~thumb.jpg", "rel": "preview", "render": "image" }
                    ]
                },
                {
                    "href": format!("{base}/assets/video-1/collection.json"),
                    "data": [{
                        "nasa_id": "video-1",
                        "title": "Launch",
                        "description": "Liftoff.",
                        "date_created": "2024-05-10T12:00:00Z",
                        "media_type": "video"
                    }],
                    "links": [
                        { "href": "https://images-assets.nasa.gov/video/video-1/video-1.srt", "rel": "captions" }
                    ]
                },
                {
                    "href": format!("{base}/assets/missing/collection.json"),
                    "data": [{
                        "nasa_id": "video-2",
                        "title": "Landing",
                        "date_created": "2023-03-03",
                        "media_type": "video"
                    }],
                    "links": [
                        { "href": "https://images-assets.nasa.gov/video/video-2/video-2~preview.webm", "rel": "preview" }
                    ]
                }
            ]
        }
    }))
}

async fn video_manifest() -> Json<Value> {
    Json(json!([
        "https://images-assets.nasa.gov/video/video-1/metadata.json",
        "https://images-assets.nasa.gov/video/video-1/video-1~orig.mp4",
        "https://images-assets.nasa.gov/video/video-1/video-1~mobile.mp4"
    ]))
}

async fn translate(headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some("DeepL-Auth-Key deepl-key");
    if !authorized {
        return (StatusCode::FORBIDDEN, Json(json!({"message": "Forbidden"})));
    }

    let text = body["text"][0].as_str().unwrap_or_default();
    let target = body["target_lang"].as_str().unwrap_or_default();
    (
        StatusCode::OK,
        Json(json!({
            "translations": [{ "detected_source_language": "EN", "text": format!("{target}: {text}") }]
        })),
    )
}

async fn star_png() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/png")], PNG_BYTES)
}

async fn untyped_media() -> Response {
    Response::new(Body::from(PNG_BYTES))
}

async fn spawn_upstream() -> Arc<Upstream> {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let upstream = Arc::new(Upstream {
        base_url: format!("http://{}", addr),
        ..Default::default()
    });

    let app = Router::new()
        .route("/planetary/apod", get(apod))
        .route("/search", get(search))
        .route("/broken/search", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route("/assets/video-1/collection.json", get(video_manifest))
        .route("/v2/translate", post(translate))
        .route("/media/star.png", get(star_png))
        .route("/media/untyped", get(untyped_media))
        .with_state(upstream.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    upstream
}

/// Loopback requests must not go through a system proxy
fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

fn endpoints(upstream: &Upstream) -> FeedEndpoints {
    FeedEndpoints {
        apod_url: format!("{}/planetary/apod", upstream.base_url),
        images_api_url: upstream.base_url.clone(),
        nasa_api_key: "test-key".to_string(),
    }
}

fn feed_service(endpoints: FeedEndpoints, translation: TranslationAdapter) -> FeedService {
    let client = client();
    FeedService::new(
        client.clone(),
        endpoints,
        MediaResolver::http(client),
        Normalizer::new(translation),
    )
}

#[tokio::test]
async fn test_daily_feed_without_translation() {
    let upstream = spawn_upstream().await;
    let feeds = feed_service(endpoints(&upstream), TranslationAdapter::disabled("pt-BR"));

    let item = feeds.daily_feed().await.unwrap();

    assert_eq!(item.id, "2024-05-10");
    assert_eq!(item.title, "Moon");
    assert_eq!(item.media_type, MediaType::Image);
    assert_eq!(item.url.as_deref(), Some("http://x/img.jpg"));
    assert_eq!(item.date, "10/05/2024");
    assert!(!item.translated);
    assert_eq!(item.translated_by, None);
}

#[tokio::test]
async fn test_latest_feed_resolves_and_sorts() {
    let upstream = spawn_upstream().await;
    let feeds = feed_service(endpoints(&upstream), TranslationAdapter::disabled("pt-BR"));
    let query = SearchQuery::new(Some("nebula".to_string()), None, Some(3));

    let items = feeds.latest_feed(&query).await.unwrap();

    let ids: Vec<&str> = items.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, vec!["video-1", "image-1", "video-2", "undated"]);

    assert_eq!(items[0].media_type, MediaType::Video);
    assert_eq!(
        items[0].url.as_deref(),
        Some("https://images-assets.nasa.gov/video/video-1/video-1~orig.mp4")
    );
    assert_eq!(items[0].date, "10/05/2024");

    assert_eq!(items[1].media_type, MediaType::Image);
    assert_eq!(
        items[1].url.as_deref(),
        Some("https://images-assets.nasa.gov/image/image-1/image-1~thumb.jpg")
    );

    // manifest endpoint 404s, so the direct link is used
    assert_eq!(items[2].media_type, MediaType::Video);
    assert_eq!(
        items[2].url.as_deref(),
        Some("https://images-assets.nasa.gov/video/video-2/video-2~preview.webm")
    );

    assert_eq!(items[3].url, None);
    assert_eq!(items[3].date, UNKNOWN_DATE);

    let recorded = upstream.search_queries.lock().unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0]["q"], "nebula");
    assert_eq!(recorded[0]["media_type"], "image,video");
    assert_eq!(recorded[0]["page_size"], "3");
}

#[tokio::test]
async fn test_latest_feed_with_deepl_translation() {
    let upstream = spawn_upstream().await;
    let translator = DeepLTranslator::with_base_url(
        client(),
        "deepl-key".to_string(),
        upstream.base_url.clone(),
    );
    let translation = TranslationAdapter::new(Arc::new(translator), "pt-BR");
    let feeds = feed_service(endpoints(&upstream), translation);

    let items = feeds.latest_feed(&SearchQuery::default()).await.unwrap();

    let nebula = items.iter().find(|item| item.id == "image-1").unwrap();
    assert_eq!(nebula.title, "PT-BR: Nebula");
    assert_eq!(nebula.explanation, "PT-BR: Gas and dust.");
    assert_eq!(nebula.original_title, "Nebula");
    assert_eq!(nebula.original_explanation, "Gas and dust.");
    assert!(nebula.translated);
    assert_eq!(nebula.translated_by.as_deref(), Some("DeepL"));
}

#[tokio::test]
async fn test_rejected_translation_key_falls_back_to_original_text() {
    let upstream = spawn_upstream().await;
    let translator = DeepLTranslator::with_base_url(
        client(),
        "wrong-key".to_string(),
        upstream.base_url.clone(),
    );
    let translation = TranslationAdapter::new(Arc::new(translator), "pt-BR");
    let feeds = feed_service(endpoints(&upstream), translation);

    let item = feeds.daily_feed().await.unwrap();

    assert_eq!(item.title, "Moon");
    assert_eq!(item.original_title, "Moon");
    assert!(item.translated);
}

#[tokio::test]
async fn test_upstream_failure_surfaces_as_error() {
    let upstream = spawn_upstream().await;
    let mut broken = endpoints(&upstream);
    broken.images_api_url = format!("{}/broken", upstream.base_url);
    broken.nasa_api_key = "revoked".to_string();
    let feeds = feed_service(broken, TranslationAdapter::disabled("pt-BR"));

    let latest = feeds.latest_feed(&SearchQuery::default()).await;
    assert!(matches!(latest, Err(UpstreamError::Status { status: 500, .. })));

    let daily = feeds.daily_feed().await;
    assert!(matches!(daily, Err(UpstreamError::Status { status: 403, .. })));
}

#[tokio::test]
async fn test_combined_feed_joins_both_feeds() {
    let upstream = spawn_upstream().await;
    let feeds = feed_service(endpoints(&upstream), TranslationAdapter::disabled("pt-BR"));

    let combined = feeds.combined_feed(&SearchQuery::default()).await.unwrap();

    assert_eq!(combined.daily.id, "2024-05-10");
    assert_eq!(combined.latest.len(), 4);
}

#[tokio::test]
async fn test_proxy_streams_bytes_unaltered() {
    let upstream = spawn_upstream().await;
    let proxy = MediaProxy::new(client());
    let url = format!("{}/media/star.png", upstream.base_url);

    let media = proxy.fetch(Some(&url)).await.unwrap();
    assert_eq!(media.content_type(), "image/png");
    assert_eq!(media.cache_control(), CACHE_CONTROL_POLICY);

    let chunks: Vec<bytes::Bytes> = media.into_stream().try_collect().await.unwrap();
    assert_eq!(chunks.concat(), PNG_BYTES);
}

#[tokio::test]
async fn test_proxy_defaults_missing_content_type() {
    let upstream = spawn_upstream().await;
    let proxy = MediaProxy::new(client());
    let url = format!("{}/media/untyped", upstream.base_url);

    let media = proxy.fetch(Some(&url)).await.unwrap();
    assert_eq!(media.content_type(), DEFAULT_CONTENT_TYPE);
    assert_eq!(media.content_type(), "application/octet-stream");

    let chunks: Vec<bytes::Bytes> = media.into_stream().try_collect().await.unwrap();
    assert_eq!(chunks.concat(), PNG_BYTES);
}

#[tokio::test]
async fn test_proxy_distinguishes_not_found() {
    let upstream = spawn_upstream().await;
    let proxy = MediaProxy::new(client());

    let missing = format!("{}/media/missing.png", upstream.base_url);
    let err = proxy.fetch(Some(&missing)).await.err().unwrap();
    assert!(matches!(err, ProxyError::NotFound { status: 404 }));

    let broken = format!("{}/broken/search", upstream.base_url);
    let err = proxy.fetch(Some(&broken)).await.err().unwrap();
    assert!(matches!(err, ProxyError::UpstreamStatus { status: 500 }));
}
