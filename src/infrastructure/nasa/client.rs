//! HTTP adapter for the NASA images API.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::{debug, warn};

use crate::domain::entities::SearchResponse;
use crate::domain::errors::ApiError;
use crate::domain::ports::{CatalogPort, FetcherPort};

/// Production base URL of the NASA images API.
pub const NASA_API_BASE: &str = "https://images-api.nasa.gov";

const USER_AGENT: &str = concat!("astroview/", env!("CARGO_PKG_VERSION"));

/// Configuration for the HTTP adapter.
#[derive(Debug, Clone)]
pub struct NasaClientConfig {
    /// Base URL of the catalog service.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for NasaClientConfig {
    fn default() -> Self {
        Self {
            base_url: NASA_API_BASE.to_string(),
            timeout_secs: 30,
        }
    }
}

/// reqwest-backed client implementing both the catalog query capability
/// and the raw byte fetcher.
///
/// Timeout behavior lives here: the core treats a timed-out request as
/// any other transport failure.
pub struct NasaClient {
    client: Client,
    base_url: String,
}

impl NasaClient {
    /// Creates a client against the production API.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self, ApiError> {
        Self::with_config(&NasaClientConfig::default())
    }

    /// Creates a client with a custom base URL and timeout.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_config(config: &NasaClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn map_request_error(error: &reqwest::Error) -> ApiError {
        if error.is_timeout() {
            ApiError::transport("request timed out")
        } else if error.is_connect() {
            ApiError::transport("failed to connect to the catalog service")
        } else {
            ApiError::transport(error.to_string())
        }
    }
}

#[async_trait]
impl CatalogPort for NasaClient {
    async fn query(
        &self,
        query: &str,
        page: u32,
        start_year: i32,
        end_year: i32,
    ) -> Result<SearchResponse, ApiError> {
        if query.trim().is_empty() {
            return Err(ApiError::invalid("search query must not be blank"));
        }
        if page == 0 {
            return Err(ApiError::invalid("pages are 1-based"));
        }

        let url = format!("{}/search", self.base_url);
        debug!(query, page, start_year, end_year, "querying catalog");

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("media_type", "image")])
            .query(&[
                ("page", page.to_string()),
                ("year_start", start_year.to_string()),
                ("year_end", end_year.to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "catalog request failed");
                Self::map_request_error(&e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "catalog rejected the query");
            return Err(ApiError::Status(status.as_u16()));
        }

        response.json::<SearchResponse>().await.map_err(|e| {
            warn!(error = %e, "failed to decode catalog response");
            ApiError::decoding(format!("failed to parse search response: {e}"))
        })
    }
}

#[async_trait]
impl FetcherPort for NasaClient {
    async fn fetch_bytes(&self, url: &str) -> Result<Bytes, ApiError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| ApiError::invalid(format!("invalid image URL {url:?}: {e}")))?;

        let response = self.client.get(parsed).send().await.map_err(|e| {
            warn!(url, error = %e, "image request failed");
            Self::map_request_error(&e)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        response
            .bytes()
            .await
            .map_err(|e| ApiError::transport(format!("failed to read body: {e}")))
    }
}
