//! Cache key generation.

use std::fmt;
use url::form_urlencoded;

/// Default namespace for proxy cache keys.
pub const DEFAULT_KEY_PREFIX: &str = "tmdb";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    key: String,
}

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Derive the canonical key for a resource path and its query parameters.
    ///
    /// Parameters are sorted by name, then value, and form-urlencoded, so the
    /// key does not depend on the order the client sent them in. Encoding keeps
    /// `&` and `=` inside values from colliding with the pair separators.
    pub fn derive(prefix: &str, path: &str, params: &[(String, String)]) -> Self {
        let path = path.trim_matches('/');
        if params.is_empty() {
            return Self::new(format!("{prefix}:{path}"));
        }

        let mut sorted: Vec<(&str, &str)> = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        sorted.sort_unstable();

        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(sorted)
            .finish();
        Self::new(format!("{prefix}:{path}?{query}"))
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CacheKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Builds cache keys under a fixed namespace.
#[derive(Debug, Clone)]
pub struct CacheKeyGenerator {
    prefix: String,
}

impl CacheKeyGenerator {
    pub fn new() -> Self {
        Self {
            prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn generate(&self, path: &str, params: &[(String, String)]) -> CacheKey {
        CacheKey::derive(&self.prefix, path, params)
    }
}

impl Default for CacheKeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}
