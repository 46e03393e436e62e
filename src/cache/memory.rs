//! Thread-safe in-memory storage.
//!
//! One [`parking_lot::RwLock`] guards the whole two-level structure. Lookups,
//! `size`, and `keys` share the read lock; mutations take the write lock.
//! Payload buffering, the only step that may block on I/O, happens before the
//! write lock is taken, so a slow or failing upstream body never stalls other
//! callers and never leaves a half-applied insert behind.

use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use super::config::{DEFAULT_CAPACITY, DEFAULT_VARY_CAPACITY};
use super::{
    BoundedLruMap, BufferingStrategy, CacheError, CacheItem, CacheResult, CacheStorage,
    ConfigError, Key, Keys, ResourceId, StorageConfig, StorageStrategy, Vary,
};
use crate::http::{Request, Response};

type VaryMap = BoundedLruMap<Vary, Arc<CacheItem>>;
type ResourceMap = BoundedLruMap<ResourceId, VaryMap>;

const DEFAULT_BOUNDS: (NonZeroUsize, NonZeroUsize) = match (
    NonZeroUsize::new(DEFAULT_CAPACITY),
    NonZeroUsize::new(DEFAULT_VARY_CAPACITY),
) {
    (Some(capacity), Some(vary_capacity)) => (capacity, vary_capacity),
    _ => panic!("default storage bounds must be non-zero"),
};

/// In-memory [`CacheStorage`] bounded by LRU eviction at two levels.
///
/// Writing a response for a resource makes that resource the most recent one
/// in the outer map; writing a variant makes it the most recent one within
/// its resource. Reads never change recency.
///
/// # Examples
///
/// ```
/// use varycache::cache::{CacheStorage, MemoryCacheStorage};
/// use varycache::http::{Request, Response, StatusCode};
///
/// let storage = MemoryCacheStorage::new();
///
/// let en = Request::new("http://example.com/").unwrap().header("Accept-Language", "en");
/// let fr = Request::new("http://example.com/").unwrap().header("Accept-Language", "fr");
/// let vary = |body: &str| {
///     Response::new(StatusCode::OK).header("Vary", "Accept-Language").body(body)
/// };
///
/// storage.insert(&en, vary("hello")).unwrap();
/// storage.insert(&fr, vary("bonjour")).unwrap();
/// assert_eq!(storage.size(), 2);
///
/// let hit = storage.get(&fr).unwrap();
/// assert_eq!(hit.response().status(), StatusCode::OK);
/// ```
#[derive(Debug)]
pub struct MemoryCacheStorage {
    capacity: NonZeroUsize,
    vary_capacity: NonZeroUsize,
    cache: RwLock<ResourceMap>,
    strategy: Arc<dyn StorageStrategy>,
}

impl Default for MemoryCacheStorage {
    fn default() -> Self {
        let (capacity, vary_capacity) = DEFAULT_BOUNDS;
        Self::from_bounds(capacity, vary_capacity, Arc::new(BufferingStrategy::new()))
    }
}

impl MemoryCacheStorage {
    /// Creates a storage with the default bounds (1000 resources, 10 variants
    /// each) and unbounded payload buffering.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage with the given bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroCapacity`] if either bound is zero.
    pub fn with_config(config: StorageConfig) -> Result<Self, ConfigError> {
        Self::with_strategy(config, Arc::new(BufferingStrategy::new()))
    }

    /// Creates a storage with the given bounds and extension strategy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroCapacity`] if either bound is zero.
    pub fn with_strategy(
        config: StorageConfig,
        strategy: Arc<dyn StorageStrategy>,
    ) -> Result<Self, ConfigError> {
        let (capacity, vary_capacity) = config.bounds()?;
        Ok(Self::from_bounds(capacity, vary_capacity, strategy))
    }

    fn from_bounds(
        capacity: NonZeroUsize,
        vary_capacity: NonZeroUsize,
        strategy: Arc<dyn StorageStrategy>,
    ) -> Self {
        Self {
            capacity,
            vary_capacity,
            cache: RwLock::new(BoundedLruMap::new(capacity)),
            strategy,
        }
    }

    /// Returns the maximum number of resources.
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Returns the maximum number of variants per resource.
    pub fn vary_capacity(&self) -> usize {
        self.vary_capacity.get()
    }

    /// Returns the number of distinct resources currently stored.
    pub fn resource_count(&self) -> usize {
        self.cache.read().len()
    }

    // Replaces the response's payload with a fully buffered copy.
    fn buffer_payload(&self, key: &Key, response: Response) -> CacheResult<Response> {
        let Some(payload) = response.payload_ref().cloned() else {
            return Ok(response);
        };

        let buffered = payload
            .open()
            .and_then(|mut reader| self.strategy.create_payload(key, &*payload, &mut reader))
            .map_err(|source| {
                warn!(key = %key, error = %source, "payload could not be buffered");
                CacheError::Uncacheable {
                    resource: key.resource().clone(),
                    reason: "payload could not be read into memory".to_owned(),
                    source: Some(source),
                }
            })?;

        if !buffered.is_available() {
            warn!(key = %key, "buffered payload is unavailable");
            return Err(CacheError::Uncacheable {
                resource: key.resource().clone(),
                reason: "buffered payload is unavailable".to_owned(),
                source: None,
            });
        }

        Ok(response.with_payload(Some(buffered)))
    }

    // Puts `item` under `key`, creating the resource's variant map on demand.
    // Caller holds the write lock.
    fn store(&self, cache: &mut ResourceMap, key: Key, item: Arc<CacheItem>) {
        let (resource, vary) = key.into_parts();

        let (variants, evicted) = cache.get_or_insert_with(resource.clone(), || {
            VaryMap::new(self.vary_capacity)
        });
        if let Some((evicted, dropped)) = evicted {
            trace!(
                resource = %evicted,
                variants = dropped.len(),
                "evicted least recently used resource"
            );
        }
        if let Some((evicted, _)) = variants.put(vary, item) {
            trace!(resource = %resource, vary = %evicted, "evicted least recently used variant");
        }
    }

    // Removes one variant; drops the resource entry once it has none left.
    // Caller holds the write lock.
    fn remove_variant(cache: &mut ResourceMap, key: &Key) -> Option<Arc<CacheItem>> {
        let variants = cache.get_mut(key.resource())?;
        let removed = variants.remove(key.vary());
        if variants.is_empty() {
            cache.remove(key.resource());
        }
        removed
    }
}

impl CacheStorage for MemoryCacheStorage {
    fn insert(&self, request: &Request, response: Response) -> CacheResult<Response> {
        let key = Key::create(request, &response);
        let cacheable = self.buffer_payload(&key, response)?;
        let item = Arc::new(self.strategy.create_cache_item(cacheable.clone()));

        debug!(key = %key, status = %cacheable.status(), "inserting response");

        let mut cache = self.cache.write();
        Self::remove_variant(&mut cache, &key);
        self.store(&mut cache, key, item);

        Ok(cacheable)
    }

    fn update(&self, request: &Request, response: Response) -> Response {
        let key = Key::create(request, &response);
        let item = Arc::new(self.strategy.create_cache_item(response.clone()));

        debug!(key = %key, status = %response.status(), "updating response");

        let mut cache = self.cache.write();
        self.store(&mut cache, key, item);

        response
    }

    fn get(&self, request: &Request) -> Option<Arc<CacheItem>> {
        let cache = self.cache.read();
        let variants = cache.get(request.resource_id())?;
        let hit = variants
            .iter()
            .find(|(vary, _)| vary.matches(request))
            .map(|(_, item)| Arc::clone(item));

        trace!(resource = %request.resource_id(), hit = hit.is_some(), "lookup by request");
        hit
    }

    fn get_by_key(&self, key: &Key) -> Option<Arc<CacheItem>> {
        let cache = self.cache.read();
        cache.get(key.resource())?.get(key.vary()).cloned()
    }

    fn invalidate(&self, resource: &ResourceId) {
        let mut cache = self.cache.write();
        let Some(variants) = cache.get(resource) else {
            return;
        };

        let keys: Vec<Key> = variants
            .keys()
            .map(|vary| Key::new(resource.clone(), vary.clone()))
            .collect();
        for key in &keys {
            Self::remove_variant(&mut cache, key);
        }

        debug!(resource = %resource, variants = keys.len(), "invalidated resource");
    }

    fn clear(&self) {
        let mut cache = self.cache.write();
        let resources: Vec<ResourceId> = cache.keys().cloned().collect();
        for resource in &resources {
            cache.remove(resource);
        }
        self.strategy.after_clear();

        debug!(resources = resources.len(), "cleared storage");
    }

    fn size(&self) -> usize {
        self.cache.read().values().map(BoundedLruMap::len).sum()
    }

    fn keys(&self) -> Keys {
        let cache = self.cache.read();
        let snapshot: BTreeSet<Key> = cache
            .iter()
            .flat_map(|(resource, variants)| {
                variants
                    .keys()
                    .map(move |vary| Key::new(resource.clone(), vary.clone()))
            })
            .collect();
        Keys::new(snapshot)
    }

    fn shutdown(&self) {
        debug!("shutting down storage");
        self.strategy.shutdown();
    }
}

impl<'a> IntoIterator for &'a MemoryCacheStorage {
    type Item = Key;
    type IntoIter = Keys;

    fn into_iter(self) -> Keys {
        self.keys()
    }
}
