use super::request::ProxyRequest;
use super::response::ProxyResponse;
use crate::cache::{
    CacheConfig, CacheKeyGenerator, CacheManager, CacheStats, CacheStore, MemoryCache,
    NullCache, RestCacheStore,
};
use crate::config::ProxyConfig;
use crate::transport::{build_client, HttpUpstream, UpstreamApi};
use crate::Result;
use http::{Method, StatusCode};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// The cache-aside proxy handler.
///
/// Holds only shared, immutable collaborators, so one instance serves any
/// number of concurrent requests.
pub struct CacheAsideProxy {
    keys: CacheKeyGenerator,
    cache: CacheManager,
    upstream: Arc<dyn UpstreamApi>,
}

impl CacheAsideProxy {
    pub fn new(keys: CacheKeyGenerator, cache: CacheManager, upstream: Arc<dyn UpstreamApi>) -> Self {
        Self {
            keys,
            cache,
            upstream,
        }
    }

    /// Wire the real collaborators described by `config`.
    ///
    /// Without cache store credentials the proxy falls back to an in-process
    /// memory cache. A zero TTL disables caching altogether.
    pub fn from_config(config: &ProxyConfig) -> Result<Self> {
        let client = build_client(config.http_timeout)?;

        let store: Arc<dyn CacheStore> = match &config.cache_store {
            _ if !config.caching_enabled() => {
                info!("cache TTL is zero, caching disabled");
                Arc::new(NullCache::new())
            }
            Some(creds) => Arc::new(RestCacheStore::new(
                client.clone(),
                creds.url.clone(),
                creds.token.clone(),
            )),
            None => {
                warn!(
                    entries = config.memory_cache_entries,
                    "no cache store configured, using in-process memory cache"
                );
                Arc::new(MemoryCache::new(config.memory_cache_entries))
            }
        };
        info!(
            store = store.name(),
            ttl_secs = config.cache_ttl.as_secs(),
            upstream = %config.upstream_base_url,
            "cache-aside proxy configured"
        );

        let upstream = Arc::new(HttpUpstream::new(
            client,
            config.upstream_base_url.clone(),
            config.upstream_token.clone(),
        ));
        let cache = CacheManager::new(
            CacheConfig::new()
                .with_ttl(config.cache_ttl)
                .with_enabled(config.caching_enabled()),
            store,
        );
        let keys = CacheKeyGenerator::new().with_prefix(config.cache_key_prefix.clone());

        Ok(Self::new(keys, cache, upstream))
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Serve one request. Every failure is rendered into the response.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn handle(&self, request: ProxyRequest) -> ProxyResponse {
        if request.method == Method::OPTIONS {
            return ProxyResponse::empty(StatusCode::OK);
        }
        if request.method != Method::GET {
            debug!("rejecting unsupported method");
            return ProxyResponse::method_not_allowed();
        }

        let key = self.keys.generate(&request.path, &request.query);
        if let Some(cached) = self.cache.lookup(&key).await {
            return ProxyResponse::json(StatusCode::OK, cached);
        }

        debug!(key = %key, query = %request.query_string(), "fetching from upstream");
        match self.upstream.fetch_json(&request.path, &request.query).await {
            Ok(body) => {
                self.cache.store(&key, &body).await;
                ProxyResponse::json(StatusCode::OK, body)
            }
            Err(err) => {
                error!(
                    key = %key,
                    status = err.client_status(),
                    error = %err,
                    "upstream request failed"
                );
                ProxyResponse::upstream_error(&err)
            }
        }
    }
}
