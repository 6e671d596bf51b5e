//! Image byte caching infrastructure.

mod memory_cache;

pub use memory_cache::{CacheConfig, DEFAULT_CAPACITY, DEFAULT_TTL, MemoryImageCache};

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::domain::ports::ImageCachePort;

/// Spawns a task that clears `cache` each time the host signals memory
/// pressure. The task ends when the sender side of `signal` is dropped.
pub fn spawn_memory_pressure_task(
    cache: Arc<dyn ImageCachePort>,
    mut signal: mpsc::UnboundedReceiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while signal.recv().await.is_some() {
            cache.clear().await;
            info!("cleared image cache on memory pressure signal");
        }
    })
}
