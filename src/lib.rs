//! pokecache - A TTL response cache with a background reaper
//!
//! Caches upstream HTTP responses by URL for a fixed time-to-live and
//! exposes them through a small caching proxy.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
mod tasks;

pub use api::AppState;
pub use cache::Cache;
pub use config::Config;
pub use error::{Error, Result};
pub use fetch::{CachedFetcher, Fetch, HttpFetcher};
