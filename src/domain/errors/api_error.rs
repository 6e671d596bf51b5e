//! Catalog and cache error taxonomy.

use thiserror::Error;

/// Errors surfaced by the search engine, catalog adapter, and image cache.
///
/// `Clone` is required so one fetch failure can be handed identically to
/// every caller coalesced onto the same in-flight request.
#[derive(Debug, Clone, Error)]
#[allow(missing_docs)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("server returned HTTP {0}")]
    Status(u16),

    #[error("decoding failed: {0}")]
    Decoding(String),

    #[error("index {index} out of range (len {len})")]
    OutOfRange { index: usize, len: usize },
}

impl ApiError {
    /// Creates an invalid-request error.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Creates a transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a decoding error.
    #[must_use]
    pub fn decoding(message: impl Into<String>) -> Self {
        Self::Decoding(message.into())
    }

    /// Returns the HTTP status code when the server rejected the request.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status(code) => Some(*code),
            _ => None,
        }
    }

    /// Returns whether re-issuing the same call could plausibly succeed.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status(_))
    }
}
