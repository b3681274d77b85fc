//! API Handlers
//!
//! HTTP request handlers for each proxy endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, RawQuery, State},
    http::{header, HeaderName},
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::cache::Cache;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetch::{CachedFetcher, Fetch, HttpFetcher};
use crate::models::{HealthResponse, ProxyRequest, StatsResponse};

/// Response header reporting whether the body came from the cache.
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Application state shared across all handlers.
///
/// Holds the one cache instance of the process; the fetcher shares it.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe response cache
    pub cache: Arc<Cache>,
    /// Cache-aside fetcher over the upstream
    pub fetcher: CachedFetcher,
    /// Upstream base URL without trailing slash
    pub upstream: Arc<str>,
}

impl AppState {
    /// Creates a new AppState around an existing cache and fetch source.
    pub fn new(cache: Arc<Cache>, source: Arc<dyn Fetch>, upstream: impl Into<Arc<str>>) -> Self {
        Self {
            fetcher: CachedFetcher::new(cache.clone(), source),
            cache,
            upstream: upstream.into(),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Starts the cache (and its reaper) and builds the HTTP client, so it
    /// must run inside the Tokio runtime.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let cache = Arc::new(Cache::with_reap_interval(
            config.cache_ttl(),
            config.reap_interval(),
        )?);
        let source = Arc::new(HttpFetcher::new(config.upstream_timeout())?);

        Ok(Self::new(cache, source, config.upstream_url.as_str()))
    }
}

/// Handler for GET /api/*path
///
/// Serves the upstream resource at `path` (plus query string), from the
/// cache when a live entry exists.
pub async fn fetch_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Response> {
    let req = ProxyRequest::new(path, query);
    if let Some(error_msg) = req.validate() {
        return Err(Error::InvalidRequest(error_msg));
    }

    let url = req.upstream_url(&state.upstream);
    let fetched = state.fetcher.fetch(&url).await?;
    debug!("Served {} ({}, {} bytes)", url, fetched.source, fetched.body.len());

    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (X_CACHE, fetched.source.as_str()),
        ],
        fetched.body,
    )
        .into_response())
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats();
    let ttl_ms = u64::try_from(state.cache.ttl().as_millis()).unwrap_or(u64::MAX);

    Json(StatsResponse::new(&stats, ttl_ms))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
