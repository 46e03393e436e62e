//! Error types for the cache storage.

use std::io;

use thiserror::Error;

use super::ResourceId;

/// Errors produced by storage operations.
///
/// Capacity overflow and cache misses are not errors: the former evicts
/// silently, the latter returns `None`.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The response declares a payload that could not be buffered into memory.
    #[error("unable to cache response for {resource}: {reason}")]
    Uncacheable {
        resource: ResourceId,
        reason: String,
        #[source]
        source: Option<io::Error>,
    },
}

/// Convenience alias for storage results.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors produced while building a [`StorageConfig`](super::StorageConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be at least 1")]
    ZeroCapacity { field: &'static str },

    #[error("invalid storage configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
