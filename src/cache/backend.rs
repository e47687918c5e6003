//! Cache store implementations.

use super::key::CacheKey;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::time::Instant;

pub type CacheResult<T> = std::result::Result<T, CacheError>;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store rejected command: {0}")]
    Store(String),

    #[error("cache lock poisoned")]
    Poisoned,
}

/// Minimal key-value capability the proxy needs from a cache store.
///
/// Values are opaque strings (serialized JSON). Expiry is the store's job:
/// `set` passes the TTL through and there is no delete path. A zero TTL
/// writes nothing.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &CacheKey) -> CacheResult<Option<String>>;
    async fn set(&self, key: &CacheKey, value: &str, ttl: Duration) -> CacheResult<()>;
    fn name(&self) -> &'static str;
}

#[derive(Clone)]
struct CacheEntry {
    data: String,
    created_at: Instant,
    ttl: Duration,
    last_accessed: Instant,
}

impl CacheEntry {
    fn new(data: String, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            data,
            created_at: now,
            ttl,
            last_accessed: now,
        }
    }

    fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }
}

/// Bounded in-process store. Runs on the tokio clock so paused-time tests can
/// drive expiry.
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    max_entries: usize,
}

impl MemoryCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            max_entries: max_entries.max(1),
        }
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .map(|entries| entries.values().filter(|e| !e.is_expired()).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn evict_if_needed(&self, entries: &mut HashMap<String, CacheEntry>) {
        entries.retain(|_, e| !e.is_expired());
        while entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.last_accessed)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(k) => {
                    entries.remove(&k);
                }
                None => break,
            }
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &CacheKey) -> CacheResult<Option<String>> {
        let mut entries = self.entries.write().map_err(|_| CacheError::Poisoned)?;
        if let Some(entry) = entries.get_mut(key.as_str()) {
            if entry.is_expired() {
                entries.remove(key.as_str());
                return Ok(None);
            }
            entry.last_accessed = Instant::now();
            return Ok(Some(entry.data.clone()));
        }
        Ok(None)
    }

    async fn set(&self, key: &CacheKey, value: &str, ttl: Duration) -> CacheResult<()> {
        if ttl.is_zero() {
            return Ok(());
        }
        let mut entries = self.entries.write().map_err(|_| CacheError::Poisoned)?;
        if !entries.contains_key(key.as_str()) {
            self.evict_if_needed(&mut entries);
        }
        entries.insert(
            key.as_str().to_string(),
            CacheEntry::new(value.to_string(), ttl),
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Store that never holds anything; every lookup misses.
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for NullCache {
    async fn get(&self, _: &CacheKey) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _: &CacheKey, _: &str, _: Duration) -> CacheResult<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "null"
    }
}
