//! Fetch Module
//!
//! Cache-aside HTTP fetching: look the URL up in the cache, go to the
//! network only on a miss, and remember what came back.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::cache::Cache;
use crate::error::{Error, Result};

// == Fetch Trait ==
/// Source of response bodies for a URL.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Performs a GET and returns the full response body.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

// == HTTP Fetcher ==
/// [`Fetch`] implementation backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pokecache/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Upstream(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}

// == Fetch Result ==
/// Where a fetched body came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Hit,
    Miss,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Hit => "HIT",
            Source::Miss => "MISS",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Fetched {
    pub body: Vec<u8>,
    pub source: Source,
}

// == Cached Fetcher ==
/// Serves URLs from the cache, falling back to a [`Fetch`] implementation.
///
/// Only successful bodies are cached; errors are returned to the caller and
/// the next request for the same URL goes to the network again.
#[derive(Clone)]
pub struct CachedFetcher {
    cache: Arc<Cache>,
    fetcher: Arc<dyn Fetch>,
}

impl CachedFetcher {
    pub fn new(cache: Arc<Cache>, fetcher: Arc<dyn Fetch>) -> Self {
        Self { cache, fetcher }
    }

    pub fn cache(&self) -> &Arc<Cache> {
        &self.cache
    }

    /// Returns the body for `url`, from the cache when possible.
    pub async fn fetch(&self, url: &str) -> Result<Fetched> {
        if let Some(body) = self.cache.get(url) {
            debug!("Cache hit for {}", url);
            return Ok(Fetched {
                body,
                source: Source::Hit,
            });
        }

        debug!("Cache miss for {}, fetching", url);
        let body = self.fetcher.fetch(url).await?;
        self.cache.add(url, body.clone());

        Ok(Fetched {
            body,
            source: Source::Miss,
        })
    }
}
