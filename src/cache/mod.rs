//! Cache Module
//!
//! Provides the in-memory URL response cache with TTL expiration and
//! background reclamation.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::Cache;

pub(crate) use store::Shared;
