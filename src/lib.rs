//! # varycache
//!
//! Thread-safe, Vary-aware in-memory storage for HTTP responses.
//!
//! Responses are stored per resource (the request URI without its fragment)
//! and, within a resource, per [`Vary`] selector: the request header values
//! the response was negotiated on. Both levels are bounded and evict the
//! least recently written entry first.
//!
//! ## Quick Start
//!
//! ```rust
//! use varycache::{CacheStorage, MemoryCacheStorage, Request, Response, StatusCode};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let storage = MemoryCacheStorage::new();
//!
//!     let request = Request::new("http://example.com/greeting")?
//!         .header("Accept-Language", "en");
//!     let response = Response::new(StatusCode::OK)
//!         .header("Vary", "Accept-Language")
//!         .body("Hello, World!");
//!
//!     storage.insert(&request, response)?;
//!
//!     let hit = storage.get(&request).ok_or("expected a cache hit")?;
//!     assert_eq!(hit.response().status(), StatusCode::OK);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod http;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use cache::{
    CacheError, CacheItem, CacheStorage, Key, MemoryCacheStorage, ResourceId, StorageConfig,
    StorageStrategy, Vary,
};
pub use http::{Headers, Request, Response, StatusCode};
