//! Port definition for the image byte cache.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::errors::ApiError;

/// Port for the concurrency-safe image byte cache.
///
/// Implementations must be safe to call from many tasks at once: no two
/// fetches for the same key may run concurrently, and a reader never
/// observes a half-written entry.
#[async_trait]
pub trait ImageCachePort: Send + Sync {
    /// Returns the cached bytes for `key` if present and unexpired.
    async fn get(&self, key: &str) -> Option<Bytes>;

    /// Stores `bytes` under `key`, expiring `ttl` from now.
    ///
    /// Overwrites any existing entry for the key.
    async fn put(&self, key: String, bytes: Bytes, ttl: Duration);

    /// Returns the cached bytes for `key`, fetching from `url` on a miss.
    ///
    /// Concurrent callers for the same key share one underlying fetch and
    /// all receive the same outcome. Nothing is cached on failure.
    async fn get_or_fetch(&self, key: &str, url: &str) -> Result<Bytes, ApiError>;

    /// Returns the current number of cached entries, including entries
    /// whose expiry has not yet been observed by a read.
    fn len(&self) -> usize;

    /// Returns true if the cache holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes all entries unconditionally. Idempotent.
    async fn clear(&self);
}
