//! Stored cache records.

use std::time::{Duration, SystemTime};

use crate::http::Response;

/// One stored representation: the response as it was inserted, plus the
/// time it entered the cache.
///
/// Items are immutable once stored. The storage hands them out as
/// `Arc<CacheItem>`, so readers keep a consistent view even if the entry is
/// replaced or evicted afterwards.
#[derive(Debug, Clone)]
pub struct CacheItem {
    response: Response,
    cached_at: SystemTime,
}

impl CacheItem {
    /// Wraps `response`, stamping it with the current time.
    pub fn new(response: Response) -> Self {
        Self::cached_at(response, SystemTime::now())
    }

    /// Wraps `response` with an explicit insertion time.
    pub fn cached_at(response: Response, cached_at: SystemTime) -> Self {
        Self {
            response,
            cached_at,
        }
    }

    /// Returns the stored response.
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Returns when the item was stored.
    pub fn stored_at(&self) -> SystemTime {
        self.cached_at
    }

    /// Returns how long the item has been stored, saturating at zero if the
    /// clock went backwards.
    pub fn age(&self) -> Duration {
        SystemTime::now()
            .duration_since(self.cached_at)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StatusCode;

    #[test]
    fn age_grows_from_insertion_time() {
        let an_hour_ago = SystemTime::now() - Duration::from_secs(3600);
        let item = CacheItem::cached_at(Response::new(StatusCode::OK), an_hour_ago);
        assert!(item.age() >= Duration::from_secs(3600));
        assert_eq!(item.stored_at(), an_hour_ago);
    }

    #[test]
    fn future_timestamp_has_zero_age() {
        let later = SystemTime::now() + Duration::from_secs(60);
        let item = CacheItem::cached_at(Response::new(StatusCode::OK), later);
        assert_eq!(item.age(), Duration::ZERO);
    }
}
