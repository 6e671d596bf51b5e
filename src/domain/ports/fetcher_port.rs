//! Port definition for raw byte fetching.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::errors::ApiError;

/// Port for fetching raw bytes over the network.
///
/// Implementations must surface HTTP statuses of 400 and above, and any
/// transport failure, as distinguishable errors - never as empty bytes.
/// Timeout and cancellation semantics belong to the implementation; the
/// core treats every failure uniformly as a fetch error.
#[async_trait]
pub trait FetcherPort: Send + Sync {
    /// Fetches the raw body at `url`.
    async fn fetch_bytes(&self, url: &str) -> Result<Bytes, ApiError>;
}
