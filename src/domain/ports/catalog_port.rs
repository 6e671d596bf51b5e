//! Port definition for catalog search queries.

use async_trait::async_trait;

use crate::domain::entities::SearchResponse;
use crate::domain::errors::ApiError;

/// Port for querying the remote image catalog.
///
/// Each page request is independent and idempotent by page number, so a
/// caller may safely re-issue a failed page.
#[async_trait]
pub trait CatalogPort: Send + Sync {
    /// Fetches one page of image results for `query`, restricted to the
    /// inclusive `start_year..=end_year` range. Pages are 1-based.
    async fn query(
        &self,
        query: &str,
        page: u32,
        start_year: i32,
        end_year: i32,
    ) -> Result<SearchResponse, ApiError>;
}
