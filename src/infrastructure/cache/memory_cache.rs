//! In-memory TTL image byte cache with single-flight fetching.
//!
//! Bounding delegates to [`lru::LruCache`]: reads promote, and a write
//! past capacity deterministically evicts the least-recently-used entry.
//! Expiration is checked lazily on read; the read that finds a stale
//! entry evicts it. There is no background sweep.
//!
//! The mutex guards only the entry table and the in-flight table, never
//! the fetch itself: the owner of a miss registers under the lock,
//! performs the network call outside it, then re-locks to publish the
//! entry and fans the outcome out to every coalesced waiter.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use lru::LruCache;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::domain::errors::ApiError;
use crate::domain::ports::{FetcherPort, ImageCachePort};

/// Default maximum number of cached entries.
pub const DEFAULT_CAPACITY: usize = 100;

/// Default entry lifetime of 24 hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Configuration for the in-memory cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries before least-recently-used eviction.
    pub capacity: usize,
    /// Lifetime applied to entries written by `get_or_fetch`.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            ttl: DEFAULT_TTL,
        }
    }
}

struct CacheEntry {
    bytes: Bytes,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

type FetchOutcome = Result<Bytes, ApiError>;

struct Tables {
    entries: LruCache<String, CacheEntry>,
    in_flight: HashMap<String, broadcast::Sender<FetchOutcome>>,
}

/// In-memory byte cache bounded by entry count, with per-entry expiration
/// and single-flight deduplication of concurrent fetches for one key.
pub struct MemoryImageCache {
    tables: Mutex<Tables>,
    fetcher: Arc<dyn FetcherPort>,
    ttl: Duration,
}

impl MemoryImageCache {
    /// Creates a cache that fills misses through `fetcher`.
    #[must_use]
    pub fn new(config: &CacheConfig, fetcher: Arc<dyn FetcherPort>) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            tables: Mutex::new(Tables {
                entries: LruCache::new(capacity),
                in_flight: HashMap::new(),
            }),
            fetcher,
            ttl: config.ttl,
        }
    }

    /// Creates a cache with the default capacity and TTL.
    #[must_use]
    pub fn with_defaults(fetcher: Arc<dyn FetcherPort>) -> Self {
        Self::new(&CacheConfig::default(), fetcher)
    }

    /// Unexpired lookup; the read that finds a stale entry evicts it.
    fn lookup(tables: &mut Tables, key: &str) -> Option<Bytes> {
        let now = Instant::now();
        let hit = tables.entries.get(key).map(|entry| {
            if entry.is_expired(now) {
                None
            } else {
                Some(entry.bytes.clone())
            }
        });
        match hit {
            Some(Some(bytes)) => {
                trace!(key, "cache hit");
                Some(bytes)
            }
            Some(None) => {
                debug!(key, "evicting expired entry");
                tables.entries.pop(key);
                None
            }
            None => {
                trace!(key, "cache miss");
                None
            }
        }
    }
}

#[async_trait]
impl ImageCachePort for MemoryImageCache {
    async fn get(&self, key: &str) -> Option<Bytes> {
        let mut tables = self.tables.lock();
        Self::lookup(&mut tables, key)
    }

    async fn put(&self, key: String, bytes: Bytes, ttl: Duration) {
        let mut tables = self.tables.lock();
        debug!(key = %key, len = bytes.len(), "storing entry");
        tables.entries.put(
            key,
            CacheEntry {
                bytes,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    async fn get_or_fetch(&self, key: &str, url: &str) -> Result<Bytes, ApiError> {
        let waiter = {
            let mut tables = self.tables.lock();
            if let Some(bytes) = Self::lookup(&mut tables, key) {
                return Ok(bytes);
            }
            if let Some(tx) = tables.in_flight.get(key) {
                Some(tx.subscribe())
            } else {
                let (tx, _) = broadcast::channel(1);
                tables.in_flight.insert(key.to_string(), tx);
                None
            }
        };

        if let Some(mut rx) = waiter {
            trace!(key, "joining in-flight fetch");
            return match rx.recv().await {
                Ok(outcome) => outcome,
                // The owner dropped without publishing (it panicked);
                // surface as a transport failure rather than hanging.
                Err(_) => Err(ApiError::transport("fetch owner vanished")),
            };
        }

        debug!(key, url, "fetching image bytes");
        let outcome = self.fetcher.fetch_bytes(url).await;

        let tx = {
            let mut tables = self.tables.lock();
            if let Ok(bytes) = &outcome {
                tables.entries.put(
                    key.to_string(),
                    CacheEntry {
                        bytes: bytes.clone(),
                        expires_at: Instant::now() + self.ttl,
                    },
                );
            }
            tables.in_flight.remove(key)
        };
        if let Some(tx) = tx {
            // Every waiter subscribed while the key was registered, i.e.
            // before the removal above; sending after the lock is released
            // hands them all the identical outcome.
            let _ = tx.send(outcome.clone());
        }
        if let Err(error) = &outcome {
            warn!(key, %error, "image fetch failed, nothing cached");
        }
        outcome
    }

    fn len(&self) -> usize {
        self.tables.lock().entries.len()
    }

    async fn clear(&self) {
        let mut tables = self.tables.lock();
        tables.entries.clear();
        debug!("cleared image cache");
    }
}
