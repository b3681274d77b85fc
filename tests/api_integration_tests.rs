//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint against a stub
//! upstream, so no network access is needed.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use pokecache::{api::create_router, AppState, Cache, Error, Fetch, Result};
use serde_json::Value;
use tower::ServiceExt;

const UPSTREAM: &str = "http://upstream.test/api/v2";

// == Helper Functions ==

/// Upstream stand-in: answers with the requested URL as JSON, 404 for
/// `missing` paths and 503 for `flaky` paths.
#[derive(Default)]
struct StubUpstream {
    calls: AtomicUsize,
}

#[async_trait]
impl Fetch for StubUpstream {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if url.contains("missing") {
            return Err(Error::UpstreamStatus(404));
        }
        if url.contains("flaky") {
            return Err(Error::UpstreamStatus(503));
        }
        Ok(serde_json::json!({ "url": url }).to_string().into_bytes())
    }
}

struct TestApp {
    router: Router,
    cache: Arc<Cache>,
    upstream: Arc<StubUpstream>,
}

impl TestApp {
    fn new(ttl: Duration) -> Self {
        let cache = Arc::new(Cache::new(ttl).unwrap());
        let upstream = Arc::new(StubUpstream::default());
        let state = AppState::new(cache.clone(), upstream.clone(), UPSTREAM);

        Self {
            router: create_router(state),
            cache,
            upstream,
        }
    }

    async fn get(&self, uri: &str) -> Response {
        self.router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    fn upstream_calls(&self) -> usize {
        self.upstream.calls.load(Ordering::SeqCst)
    }
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn x_cache(response: &Response) -> &str {
    response.headers()["x-cache"].to_str().unwrap()
}

// == /api Endpoint Tests ==

#[tokio::test]
async fn test_api_miss_then_hit() {
    let app = TestApp::new(Duration::from_secs(300));

    let first = app.get("/api/location-area").await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(x_cache(&first), "MISS");
    let json = body_to_json(first.into_body()).await;
    assert_eq!(json["url"], "http://upstream.test/api/v2/location-area");

    let second = app.get("/api/location-area").await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(x_cache(&second), "HIT");
    let json = body_to_json(second.into_body()).await;
    assert_eq!(json["url"], "http://upstream.test/api/v2/location-area");

    assert_eq!(app.upstream_calls(), 1);
}

#[tokio::test]
async fn test_api_query_is_part_of_cache_key() {
    let app = TestApp::new(Duration::from_secs(300));

    app.get("/api/location-area?offset=0&limit=20").await;
    let next_page = app.get("/api/location-area?offset=20&limit=20").await;

    assert_eq!(x_cache(&next_page), "MISS");
    assert_eq!(app.upstream_calls(), 2);
    assert!(app
        .cache
        .get("http://upstream.test/api/v2/location-area?offset=20&limit=20")
        .is_some());
}

#[tokio::test]
async fn test_api_refetches_after_ttl() {
    let app = TestApp::new(Duration::from_millis(5));

    app.get("/api/pokemon/pikachu").await;
    tokio::time::sleep(Duration::from_millis(15)).await;
    let again = app.get("/api/pokemon/pikachu").await;

    assert_eq!(x_cache(&again), "MISS");
    assert_eq!(app.upstream_calls(), 2);
}

#[tokio::test]
async fn test_api_upstream_not_found() {
    let app = TestApp::new(Duration::from_secs(300));

    let response = app.get("/api/pokemon/missingno-missing").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("404"));
    assert!(app.cache.is_empty());
}

#[tokio::test]
async fn test_api_upstream_failure_is_bad_gateway_and_not_cached() {
    let app = TestApp::new(Duration::from_secs(300));

    let first = app.get("/api/flaky").await;
    let second = app.get("/api/flaky").await;

    assert_eq!(first.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(second.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(app.upstream_calls(), 2);
}

#[tokio::test]
async fn test_api_rejects_path_traversal() {
    let app = TestApp::new(Duration::from_secs(300));

    let response = app.get("/api/pokemon/../../admin").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
    assert_eq!(app.upstream_calls(), 0);
}

#[tokio::test]
async fn test_api_rejects_encoded_backslash_traversal() {
    let app = TestApp::new(Duration::from_secs(300));

    let response = app.get("/api/pokemon/..%5C..%5Cadmin").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.upstream_calls(), 0);
    assert!(app.cache.is_empty());
}

// == STATS Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint_counts() {
    let app = TestApp::new(Duration::from_secs(300));

    app.get("/api/berry/1").await; // miss
    app.get("/api/berry/1").await; // hit
    app.get("/api/berry/2").await; // miss

    let response = app.get("/stats").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 2);
    assert_eq!(json["total_entries"], 2);
    assert_eq!(json["reaped"], 0);
    assert_eq!(json["ttl_ms"], 300_000);
}

#[tokio::test(start_paused = true)]
async fn test_stats_reflect_reaper() {
    let app = TestApp::new(Duration::from_secs(1));

    app.get("/api/berry/1").await;
    // Reaper ticks at 1s (age == ttl, kept) and 2s (removed)
    tokio::time::sleep(Duration::from_millis(2500)).await;

    let json = body_to_json(app.get("/stats").await.into_body()).await;
    assert_eq!(json["total_entries"], 0);
    assert_eq!(json["reaped"], 1);
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new(Duration::from_secs(300));

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}

#[tokio::test]
async fn test_unknown_route() {
    let app = TestApp::new(Duration::from_secs(300));

    let response = app.get("/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
