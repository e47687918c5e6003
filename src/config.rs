//! Process-wide proxy configuration.
//!
//! Built once at startup and shared read-only. [`ProxyConfig::from_env`] reads
//! the process environment; [`ProxyConfig::from_lookup`] takes any lookup
//! function so tests never touch real environment variables.

use crate::cache::{DEFAULT_KEY_PREFIX, DEFAULT_TTL};
use crate::error::{Error, ErrorContext};
use crate::Result;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const ENV_UPSTREAM_TOKEN: &str = "TMDB_ACCESS_TOKEN";
pub const ENV_CACHE_STORE_URL: &str = "UPSTASH_REDIS_REST_URL";
pub const ENV_CACHE_STORE_TOKEN: &str = "UPSTASH_REDIS_REST_TOKEN";
pub const ENV_UPSTREAM_BASE_URL: &str = "TMDB_PROXY_BASE_URL";
pub const ENV_MOUNT_PREFIX: &str = "TMDB_PROXY_MOUNT";
pub const ENV_LISTEN_ADDR: &str = "TMDB_PROXY_LISTEN";
pub const ENV_CACHE_TTL_SECS: &str = "TMDB_PROXY_CACHE_TTL_SECS";
pub const ENV_CACHE_PREFIX: &str = "TMDB_PROXY_CACHE_PREFIX";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "TMDB_PROXY_HTTP_TIMEOUT_SECS";
pub const ENV_MEMORY_CACHE_ENTRIES: &str = "TMDB_PROXY_MEMORY_CACHE_ENTRIES";

pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_MOUNT_PREFIX: &str = "/api/tmdb/";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MEMORY_CACHE_ENTRIES: usize = 10_000;

/// Credentials for the REST cache store.
#[derive(Clone, PartialEq, Eq)]
pub struct CacheStoreCredentials {
    pub url: String,
    pub token: String,
}

impl fmt::Debug for CacheStoreCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStoreCredentials")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Clone)]
pub struct ProxyConfig {
    pub upstream_token: String,
    pub upstream_base_url: String,
    /// `None` runs the proxy on an in-process memory cache.
    pub cache_store: Option<CacheStoreCredentials>,
    pub mount_prefix: String,
    pub listen_addr: String,
    pub cache_ttl: Duration,
    pub cache_key_prefix: String,
    pub http_timeout: Duration,
    pub memory_cache_entries: usize,
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("upstream_token", &"<redacted>")
            .field("upstream_base_url", &self.upstream_base_url)
            .field("cache_store", &self.cache_store)
            .field("mount_prefix", &self.mount_prefix)
            .field("listen_addr", &self.listen_addr)
            .field("cache_ttl", &self.cache_ttl)
            .field("cache_key_prefix", &self.cache_key_prefix)
            .field("http_timeout", &self.http_timeout)
            .field("memory_cache_entries", &self.memory_cache_entries)
            .finish()
    }
}

impl ProxyConfig {
    /// Defaults for everything except the upstream token.
    pub fn new(upstream_token: impl Into<String>) -> Self {
        Self {
            upstream_token: upstream_token.into(),
            upstream_base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            cache_store: None,
            mount_prefix: DEFAULT_MOUNT_PREFIX.to_string(),
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            cache_ttl: DEFAULT_TTL,
            cache_key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            memory_cache_entries: DEFAULT_MEMORY_CACHE_ENTRIES,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let token = get(ENV_UPSTREAM_TOKEN).ok_or_else(|| {
            Error::configuration_with_context(
                "upstream bearer token is not set",
                ErrorContext::new()
                    .with_field_path(ENV_UPSTREAM_TOKEN)
                    .with_source("config"),
            )
        })?;
        let mut cfg = Self::new(token);

        cfg.cache_store = match (get(ENV_CACHE_STORE_URL), get(ENV_CACHE_STORE_TOKEN)) {
            (Some(url), Some(token)) => Some(CacheStoreCredentials { url, token }),
            (None, None) => None,
            (url, _) => {
                let missing = if url.is_none() {
                    ENV_CACHE_STORE_URL
                } else {
                    ENV_CACHE_STORE_TOKEN
                };
                return Err(Error::configuration_with_context(
                    "cache store needs both a URL and a token",
                    ErrorContext::new()
                        .with_field_path(missing)
                        .with_source("config"),
                ));
            }
        };

        if let Some(url) = get(ENV_UPSTREAM_BASE_URL) {
            cfg.upstream_base_url = url;
        }
        if let Some(prefix) = get(ENV_MOUNT_PREFIX) {
            cfg.mount_prefix = prefix;
        }
        if let Some(addr) = get(ENV_LISTEN_ADDR) {
            cfg.listen_addr = addr;
        }
        if let Some(prefix) = get(ENV_CACHE_PREFIX) {
            cfg.cache_key_prefix = prefix;
        }
        if let Some(secs) = parse_var::<u64>(ENV_CACHE_TTL_SECS, get(ENV_CACHE_TTL_SECS))? {
            cfg.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>(ENV_HTTP_TIMEOUT_SECS, get(ENV_HTTP_TIMEOUT_SECS))? {
            cfg.http_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(n) = parse_var::<usize>(ENV_MEMORY_CACHE_ENTRIES, get(ENV_MEMORY_CACHE_ENTRIES))? {
            cfg.memory_cache_entries = n.max(1);
        }

        Ok(cfg)
    }

    /// A zero cache TTL turns caching off for every store.
    pub fn caching_enabled(&self) -> bool {
        !self.cache_ttl.is_zero()
    }

    pub fn with_upstream_base_url(mut self, url: impl Into<String>) -> Self {
        self.upstream_base_url = url.into();
        self
    }

    pub fn with_cache_store(mut self, url: impl Into<String>, token: impl Into<String>) -> Self {
        self.cache_store = Some(CacheStoreCredentials {
            url: url.into(),
            token: token.into(),
        });
        self
    }

    pub fn with_mount_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.mount_prefix = prefix.into();
        self
    }

    pub fn with_listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.listen_addr = addr.into();
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_cache_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.cache_key_prefix = prefix.into();
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }
}

fn parse_var<T: FromStr>(name: &str, raw: Option<String>) -> Result<Option<T>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    raw.trim().parse::<T>().map(Some).map_err(|_| {
        Error::configuration_with_context(
            "expected a non-negative integer",
            ErrorContext::new()
                .with_field_path(name)
                .with_details(format!("got '{raw}'"))
                .with_source("config"),
        )
    })
}
