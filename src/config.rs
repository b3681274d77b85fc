//! Configuration Module
//!
//! Handles loading and validating configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::error::{Error, Result};

/// Default upstream: the public API the cache was built to front.
pub const DEFAULT_UPSTREAM_URL: &str = "https://pokeapi.co/api/v2";

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache entry time-to-live in milliseconds
    pub cache_ttl_ms: u64,
    /// Reaper period in milliseconds, equal to the TTL unless overridden
    pub reap_interval_ms: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Base URL that `/api/*path` requests are forwarded to
    pub upstream_url: String,
    /// Upstream request timeout in seconds
    pub upstream_timeout_secs: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL_MS` - Entry TTL in milliseconds (default: 5000)
    /// - `REAP_INTERVAL_MS` - Reaper period in milliseconds (default: the TTL)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `UPSTREAM_URL` - Upstream base URL (default: PokeAPI v2)
    /// - `UPSTREAM_TIMEOUT_SECS` - Upstream request timeout (default: 10)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable source.
    ///
    /// Missing or unparseable values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parsed = |name: &str| lookup(name).and_then(|v| v.trim().parse().ok());

        let cache_ttl_ms = parsed("CACHE_TTL_MS").unwrap_or(defaults.cache_ttl_ms);

        Self {
            cache_ttl_ms,
            reap_interval_ms: parsed("REAP_INTERVAL_MS").unwrap_or(cache_ttl_ms),
            server_port: lookup("SERVER_PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.server_port),
            upstream_url: lookup("UPSTREAM_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.upstream_url),
            upstream_timeout_secs: parsed("UPSTREAM_TIMEOUT_SECS")
                .unwrap_or(defaults.upstream_timeout_secs),
        }
    }

    /// Rejects values the cache or the HTTP client cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.cache_ttl_ms == 0 {
            return Err(Error::InvalidConfig("CACHE_TTL_MS must be positive".to_string()));
        }
        if self.reap_interval_ms == 0 {
            return Err(Error::InvalidConfig(
                "REAP_INTERVAL_MS must be positive".to_string(),
            ));
        }
        if self.upstream_timeout_secs == 0 {
            return Err(Error::InvalidConfig(
                "UPSTREAM_TIMEOUT_SECS must be positive".to_string(),
            ));
        }
        if !self.upstream_url.starts_with("http://") && !self.upstream_url.starts_with("https://")
        {
            return Err(Error::InvalidConfig(format!(
                "UPSTREAM_URL must be an http(s) URL, got '{}'",
                self.upstream_url
            )));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn reap_interval(&self) -> Duration {
        Duration::from_millis(self.reap_interval_ms)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_ttl_ms: 5_000,
            reap_interval_ms: 5_000,
            server_port: 3000,
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            upstream_timeout_secs: 10,
        }
    }
}
