//! Cache backend errors
//!
//! These never cross the [`CachePort`](crate::CachePort) boundary. Backends
//! return them internally, and the port implementations log and absorb them.

/// Errors raised by cache backends
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Could not reach the backend
    #[error("cache connection error: {0}")]
    Connection(String),

    /// Backend rejected or failed a command
    #[error("cache backend error: {0}")]
    Backend(String),

    /// Value could not be encoded or decoded
    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for backend operations
pub type CacheResult<T> = Result<T, CacheError>;
