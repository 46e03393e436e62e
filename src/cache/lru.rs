//! Fixed-capacity map with least-recently-put eviction.
//!
//! [`BoundedLruMap`] is the container behind both levels of the storage:
//! resources in the outer map and Vary variants in each inner map.
//!
//! ## Recency policy
//!
//! Only writes refresh recency: [`put`](BoundedLruMap::put) and
//! [`get_or_insert_with`](BoundedLruMap::get_or_insert_with). Reads ([`get`](BoundedLruMap::get),
//! [`iter`](BoundedLruMap::iter)) leave the order alone, which is what lets
//! lookups run under a shared lock.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;

use ::lru::LruCache;

/// A map holding at most `capacity` entries, evicting the least recently
/// written entry on overflow.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
/// use varycache::cache::BoundedLruMap;
///
/// let mut map = BoundedLruMap::new(NonZeroUsize::new(2).unwrap());
/// map.put("a", 1);
/// map.put("b", 2);
/// assert_eq!(map.get("a"), Some(&1)); // reads do not refresh "a"
///
/// let evicted = map.put("c", 3);
/// assert_eq!(evicted, Some(("a", 1)));
/// assert_eq!(map.keys().collect::<Vec<_>>(), vec![&"c", &"b"]);
/// ```
pub struct BoundedLruMap<K, V> {
    inner: LruCache<K, V>,
}

impl<K: Hash + Eq, V> BoundedLruMap<K, V> {
    /// Creates an empty map bounded at `capacity` entries.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            inner: LruCache::new(capacity),
        }
    }

    /// Returns the maximum number of entries.
    pub fn capacity(&self) -> NonZeroUsize {
        self.inner.cap()
    }

    /// Returns the number of entries currently stored.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Inserts or replaces `key`, making it the most recent entry.
    ///
    /// Returns the entry evicted to stay within capacity, if any. Replacing
    /// an existing key never evicts anything.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        let replacing = self.inner.contains(&key);
        match self.inner.push(key, value) {
            Some(evicted) if !replacing => Some(evicted),
            _ => None,
        }
    }

    /// Returns the value for `key`, inserting `make()` if absent, and makes
    /// it the most recent entry.
    ///
    /// Also returns the entry evicted to make room, if any.
    pub fn get_or_insert_with<F>(&mut self, key: K, make: F) -> (&mut V, Option<(K, V)>)
    where
        F: FnOnce() -> V,
    {
        let full = self.inner.len() == self.inner.cap().get();
        let evicted = if full && !self.inner.contains(&key) {
            self.inner.pop_lru()
        } else {
            None
        };
        (self.inner.get_or_insert_mut(key, make), evicted)
    }

    /// Returns the value for `key` without affecting recency.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.peek(key)
    }

    /// Returns a mutable reference to the value for `key` without affecting recency.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.peek_mut(key)
    }

    /// Returns `true` if `key` is present.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.contains(key)
    }

    /// Removes `key`, returning its value. No-op if absent.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.pop(key)
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Iterates entries from most to least recently written.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.inner.iter()
    }

    /// Iterates keys from most to least recently written.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.inner.iter().map(|(k, _)| k)
    }

    /// Iterates values from most to least recently written.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.inner.iter().map(|(_, v)| v)
    }
}

impl<K: Hash + Eq, V> fmt::Debug for BoundedLruMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedLruMap")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}
