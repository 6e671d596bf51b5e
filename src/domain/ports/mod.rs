//! Port definitions.
//!
//! One trait per external capability the core consumes, so tests can
//! substitute doubles for the real network and cache adapters.

mod catalog_port;
mod fetcher_port;
mod image_cache_port;

pub use catalog_port::CatalogPort;
pub use fetcher_port::FetcherPort;
pub use image_cache_port::ImageCachePort;
