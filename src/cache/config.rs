//! Construction-time storage configuration.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Default number of resources held by the storage.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Default number of Vary variants held per resource.
pub const DEFAULT_VARY_CAPACITY: usize = 10;

/// Capacity bounds for [`MemoryCacheStorage`](super::MemoryCacheStorage).
///
/// Both bounds must be at least 1. Missing fields in a JSON document fall
/// back to the defaults.
///
/// # Examples
///
/// ```
/// use varycache::cache::StorageConfig;
///
/// let config = StorageConfig::from_json(r#"{ "capacity": 250 }"#).unwrap();
/// assert_eq!(config.capacity, 250);
/// assert_eq!(config.vary_capacity, 10);
///
/// assert!(StorageConfig::from_json(r#"{ "vary_capacity": 0 }"#).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Maximum number of distinct resources.
    pub capacity: usize,
    /// Maximum number of variants per resource.
    pub vary_capacity: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            vary_capacity: DEFAULT_VARY_CAPACITY,
        }
    }
}

impl StorageConfig {
    /// Creates a configuration with explicit bounds.
    pub fn new(capacity: usize, vary_capacity: usize) -> Self {
        Self {
            capacity,
            vary_capacity,
        }
    }

    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Parse`]: malformed JSON or unknown fields.
    /// - [`ConfigError::ZeroCapacity`]: a bound is zero.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.bounds()?;
        Ok(config)
    }

    /// Returns the validated `(capacity, vary_capacity)` pair.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroCapacity`] naming the first zero bound.
    pub fn bounds(&self) -> Result<(NonZeroUsize, NonZeroUsize), ConfigError> {
        let capacity = NonZeroUsize::new(self.capacity)
            .ok_or(ConfigError::ZeroCapacity { field: "capacity" })?;
        let vary_capacity = NonZeroUsize::new(self.vary_capacity).ok_or(
            ConfigError::ZeroCapacity {
                field: "vary_capacity",
            },
        )?;
        Ok((capacity, vary_capacity))
    }
}
