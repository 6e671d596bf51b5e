//! Infrastructure layer containing adapters for external services.

/// Image byte caching.
pub mod cache;
/// NASA images API adapter.
pub mod nasa;
