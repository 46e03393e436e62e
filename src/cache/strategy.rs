//! Pluggable storage behavior.
//!
//! [`MemoryCacheStorage`](super::MemoryCacheStorage) delegates the decisions
//! that differ between deployments to a [`StorageStrategy`]: how a response
//! becomes a stored [`CacheItem`], how payload bytes are buffered, and what
//! to release on `clear` and `shutdown`. Every method has a default, so an
//! implementor only overrides what it needs.

use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;

use super::{CacheItem, Key};
use crate::http::{ByteArrayPayload, Payload, Response};

/// Capability interface the storage consults at its extension points.
///
/// [`create_payload`](Self::create_payload) and
/// [`create_cache_item`](Self::create_cache_item) run before the storage
/// takes its write lock; the former may block on I/O.
/// [`after_clear`](Self::after_clear) runs under the write lock and must not
/// call back into the storage.
pub trait StorageStrategy: fmt::Debug + Send + Sync {
    /// Turns a cacheable response into the record that will be stored.
    fn create_cache_item(&self, response: Response) -> CacheItem {
        CacheItem::new(response)
    }

    /// Buffers `payload`'s content, read from `reader`, into a re-readable payload.
    ///
    /// The storage rejects the insert if this returns an error or a payload
    /// that reports itself unavailable.
    ///
    /// # Errors
    ///
    /// Any read error from `reader`.
    fn create_payload(
        &self,
        key: &Key,
        payload: &dyn Payload,
        reader: &mut dyn Read,
    ) -> io::Result<Arc<dyn Payload>> {
        let _ = key;
        let buffered = ByteArrayPayload::from_reader(reader, payload.mime_type(), None)?;
        Ok(Arc::new(buffered))
    }

    /// Called after every `clear`, still under the write lock.
    fn after_clear(&self) {}

    /// Called by `shutdown`.
    fn shutdown(&self) {}
}

/// The default strategy: buffer payloads in memory, optionally bounded.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use varycache::cache::{BufferingStrategy, MemoryCacheStorage, StorageConfig};
///
/// let strategy = Arc::new(BufferingStrategy::with_max_bytes(64 * 1024));
/// let storage = MemoryCacheStorage::with_strategy(StorageConfig::default(), strategy).unwrap();
/// assert_eq!(storage.capacity(), 1000);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BufferingStrategy {
    max_bytes: Option<u64>,
}

impl BufferingStrategy {
    /// Buffers payloads of any size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuses to buffer payloads larger than `max_bytes`.
    pub fn with_max_bytes(max_bytes: u64) -> Self {
        Self {
            max_bytes: Some(max_bytes),
        }
    }

    /// Returns the configured payload size limit.
    pub fn max_bytes(&self) -> Option<u64> {
        self.max_bytes
    }
}

impl StorageStrategy for BufferingStrategy {
    fn create_payload(
        &self,
        _key: &Key,
        payload: &dyn Payload,
        reader: &mut dyn Read,
    ) -> io::Result<Arc<dyn Payload>> {
        let buffered = ByteArrayPayload::from_reader(reader, payload.mime_type(), self.max_bytes)?;
        Ok(Arc::new(buffered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ResourceId, Vary};

    fn key() -> Key {
        Key::new(ResourceId::parse("http://example.com/").unwrap(), Vary::empty())
    }

    #[test]
    fn default_buffers_and_keeps_mime_type() {
        let source = ByteArrayPayload::new("body", "text/css");
        let mut reader = source.open().unwrap();
        let p = BufferingStrategy::new()
            .create_payload(&key(), &source, &mut reader)
            .unwrap();
        assert_eq!(p.mime_type(), "text/css");
        assert!(p.is_buffered());
        assert_eq!(p.length(), Some(4));
    }

    #[test]
    fn limit_rejects_large_payloads() {
        let source = ByteArrayPayload::new(vec![0u8; 100], "application/octet-stream");
        let mut reader = source.open().unwrap();
        let result = BufferingStrategy::with_max_bytes(10).create_payload(&key(), &source, &mut reader);
        assert!(result.is_err());
    }
}
