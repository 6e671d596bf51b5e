//! Astroview - a client core for browsing the NASA image catalog.
//!
//! This crate provides the non-visual core of an image catalog browser:
//! a paginated search engine with observer notifications, a pure mapper
//! from the raw catalog envelope to domain records, and a concurrency-safe
//! image byte cache with time-based expiration and single-flight fetch
//! deduplication. Rendering, navigation, and persisted settings are the
//! host application's concern.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the search orchestration engine.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;

/// Current version of the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = "astroview";
