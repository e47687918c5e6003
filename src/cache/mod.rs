//! # Response Caching Module
//!
//! Cache-aside storage for upstream responses. The proxy consults the cache
//! before calling the upstream API and writes fresh responses back with a TTL.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CacheManager`] | Never-failing front: JSON decode, TTL, statistics |
//! | [`CacheStore`] | `get`/`set` capability implemented by every store |
//! | [`RestCacheStore`] | Redis over the Upstash REST protocol |
//! | [`MemoryCache`] | Bounded in-process store with TTL |
//! | [`NullCache`] | Always misses; disables caching |
//! | [`CacheKey`] | Canonical key derived from resource path and query |
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tmdb_cache_proxy::cache::{CacheConfig, CacheKeyGenerator, CacheManager, MemoryCache};
//!
//! let cache = CacheManager::new(
//!     CacheConfig::new().with_ttl(Duration::from_secs(3600)),
//!     Arc::new(MemoryCache::new(1000)),
//! );
//! let key = CacheKeyGenerator::new().generate("movie/550", &[]);
//! assert_eq!(key.as_str(), "tmdb:movie/550");
//! # let _ = cache;
//! ```

mod backend;
mod key;
mod manager;
mod rest;

pub use backend::{CacheError, CacheResult, CacheStore, MemoryCache, NullCache};
pub use key::{CacheKey, CacheKeyGenerator, DEFAULT_KEY_PREFIX};
pub use manager::{CacheConfig, CacheManager, CacheStats, DEFAULT_TTL};
pub use rest::RestCacheStore;
