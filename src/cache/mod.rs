//! Vary-aware in-memory response storage.
//!
//! The storage keeps responses under a two-level, bounded LRU structure:
//!
//! ```text
//! BoundedLruMap<ResourceId, BoundedLruMap<Vary, Arc<CacheItem>>>
//!      capacity (default 1000)      vary_capacity (default 10)
//! ```
//!
//! A request finds its resource by normalized URI, then the first stored
//! [`Vary`] selector whose recorded header values it carries. Freshness,
//! validation, and deciding *whether* a response may be cached belong to the
//! caller; this module only stores, finds, and evicts.
//!
//! ## Core types
//!
//! - [`CacheStorage`]: the operations a cache coordinator depends on.
//! - [`MemoryCacheStorage`]: the thread-safe in-memory implementation.
//! - [`Key`], [`ResourceId`], [`Vary`]: how stored representations are named.
//! - [`CacheItem`]: a stored record, handed out as `Arc<CacheItem>`.
//! - [`StorageStrategy`]: extension points for item creation, payload
//!   buffering, and cleanup hooks.
//! - [`BoundedLruMap`]: the fixed-capacity map behind both levels.

use std::collections::{BTreeSet, btree_set};
use std::sync::Arc;

pub mod config;
pub mod error;
pub mod item;
pub mod key;
pub mod lru;
pub mod memory;
pub mod strategy;
pub mod vary;

pub use config::StorageConfig;
pub use error::{CacheError, CacheResult, ConfigError};
pub use item::CacheItem;
pub use key::{Key, ResourceId};
pub use lru::BoundedLruMap;
pub use memory::MemoryCacheStorage;
pub use strategy::{BufferingStrategy, StorageStrategy};
pub use vary::Vary;

use crate::http::{Request, Response};

/// Operations a cache coordinator performs against its storage.
///
/// Implementations must be safe to share across threads; every method takes
/// `&self`.
pub trait CacheStorage: Send + Sync {
    /// Stores `response` as the answer to `request`, buffering its payload.
    ///
    /// Replaces an existing entry under the same [`Key`]; other variants of
    /// the resource are left alone. Returns the response as stored.
    ///
    /// # Errors
    ///
    /// [`CacheError::Uncacheable`] if the payload cannot be buffered. Nothing
    /// is stored in that case.
    fn insert(&self, request: &Request, response: Response) -> CacheResult<Response>;

    /// Overwrites the entry under the computed [`Key`] without buffering the
    /// payload or removing anything first. Meant for metadata refreshes of a
    /// response that is already cached.
    fn update(&self, request: &Request, response: Response) -> Response;

    /// Finds the stored variant of `request`'s resource that matches its
    /// negotiation headers, most recently stored first.
    fn get(&self, request: &Request) -> Option<Arc<CacheItem>>;

    /// Exact lookup by full key.
    fn get_by_key(&self, key: &Key) -> Option<Arc<CacheItem>>;

    /// Removes every stored variant of `resource`.
    fn invalidate(&self, resource: &ResourceId);

    /// Removes everything.
    fn clear(&self);

    /// Returns the total number of stored variants across all resources.
    fn size(&self) -> usize;

    /// Returns a snapshot of every stored key.
    fn keys(&self) -> Keys;

    /// Releases storage-level resources.
    fn shutdown(&self);
}

/// Point-in-time snapshot of stored keys, ordered by resource then Vary.
///
/// Later mutations of the storage are not reflected.
#[derive(Debug)]
pub struct Keys {
    inner: btree_set::IntoIter<Key>,
}

impl Keys {
    pub(crate) fn new(keys: BTreeSet<Key>) -> Self {
        Self {
            inner: keys.into_iter(),
        }
    }
}

impl Iterator for Keys {
    type Item = Key;

    fn next(&mut self) -> Option<Key> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Keys {}
