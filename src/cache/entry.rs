//! Cache Entry Module
//!
//! Defines the structure for individual cache entries and their age-based expiry.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// A single cached payload together with the moment it was stored.
///
/// Entries are never modified after creation; an overwrite replaces the
/// whole entry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Creation instant (monotonic clock)
    pub created_at: Instant,
    /// The stored payload
    pub value: Vec<u8>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped with the current instant.
    pub fn new(value: Vec<u8>) -> Self {
        Self {
            created_at: Instant::now(),
            value,
        }
    }

    // == Age ==
    /// Time elapsed since the entry was created.
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    // == Is Expired ==
    /// Checks whether the entry has outlived `ttl`.
    ///
    /// Boundary condition: an entry whose age is exactly `ttl` is still
    /// live. It expires once its age is strictly greater than `ttl`.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() > ttl
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entry_fresh() {
        let entry = CacheEntry::new(b"testdata".to_vec());

        assert_eq!(entry.value, b"testdata");
        assert!(!entry.is_expired(Duration::from_secs(5)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expiration() {
        let entry = CacheEntry::new(b"testdata".to_vec());

        tokio::time::advance(Duration::from_millis(5001)).await;

        assert!(entry.is_expired(Duration::from_secs(5)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new(b"testdata".to_vec());

        tokio::time::advance(Duration::from_secs(5)).await;

        // Age == ttl is not yet expired
        assert_eq!(entry.age(), Duration::from_secs(5));
        assert!(!entry.is_expired(Duration::from_secs(5)));

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(entry.is_expired(Duration::from_secs(5)));
    }

    #[test]
    fn test_entry_outside_runtime() {
        // Instant::now() works without a runtime; only pausing needs one
        let entry = CacheEntry::new(Vec::new());
        assert!(entry.value.is_empty());
        assert!(!entry.is_expired(Duration::from_secs(60)));
    }
}
