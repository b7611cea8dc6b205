//! Error types for the locale cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Transport Error Enum ==
/// Failure reported by a translation source.
#[derive(Error, Debug)]
pub enum TransportError {
    /// 401 from the locale endpoint
    #[error("Unauthorized action")]
    Unauthorized,

    /// 403 from the locale endpoint
    #[error("Permission denied")]
    Forbidden,

    /// 404 from the locale endpoint
    #[error("Resource not found")]
    NotFound,

    /// Any other non-success status
    #[error("{status} {status_text}")]
    Status { status: u16, status_text: String },

    /// The request could not be sent or its body could not be read
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Failure from a non-HTTP source
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    // == From Status ==
    /// Maps a non-success HTTP status to the matching transport error.
    pub fn from_status(status: u16, status_text: impl Into<String>) -> Self {
        match status {
            401 => TransportError::Unauthorized,
            403 => TransportError::Forbidden,
            404 => TransportError::NotFound,
            _ => TransportError::Status {
                status,
                status_text: status_text.into(),
            },
        }
    }
}

// == Cache Error Enum ==
/// Unified error type for the locale cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Malformed key or prefix, rejected before any I/O
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The translation source could not be reached or answered with an error
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    /// A stored entry could not be parsed back into a cache entry
    #[error("Deserialization failure: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The durable medium could not be opened
    #[error("Storage failure: {0}")]
    Storage(#[from] std::io::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the locale cache.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Result type returned by translation sources.
pub type TransportResult<T> = std::result::Result<T, TransportError>;
