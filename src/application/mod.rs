//! Application layer orchestrating domain operations.

/// Paginated search orchestration.
pub mod search_engine;

pub use search_engine::{SearchEngine, SearchPhase};
