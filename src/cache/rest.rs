//! Redis cache store spoken to over HTTPS using the Upstash REST protocol.
//!
//! Each command is POSTed to the store URL as a JSON array
//! (`["GET", key]`, `["SET", key, value, "EX", ttl]`) with a bearer token.
//! The reply is `{"result": ...}` on success or `{"error": "..."}`.

use super::backend::{CacheError, CacheResult, CacheStore};
use super::key::CacheKey;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct CommandReply {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

pub struct RestCacheStore {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl RestCacheStore {
    pub fn new(client: reqwest::Client, url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    async fn command(&self, args: &[&str]) -> CacheResult<Value> {
        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(args)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        let reply: Option<CommandReply> = serde_json::from_str(&body).ok();

        if let Some(message) = reply.as_ref().and_then(|r| r.error.clone()) {
            return Err(CacheError::Store(message));
        }
        if !status.is_success() {
            return Err(CacheError::Store(format!("HTTP {}: {}", status.as_u16(), body)));
        }
        reply
            .map(|r| r.result)
            .ok_or_else(|| CacheError::Store(format!("unreadable reply: {body}")))
    }
}

#[async_trait]
impl CacheStore for RestCacheStore {
    async fn get(&self, key: &CacheKey) -> CacheResult<Option<String>> {
        match self.command(&["GET", key.as_str()]).await? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            // Values written by other clients may come back already decoded.
            other => Ok(Some(other.to_string())),
        }
    }

    async fn set(&self, key: &CacheKey, value: &str, ttl: Duration) -> CacheResult<()> {
        if ttl.is_zero() {
            return Ok(());
        }
        // Redis rejects `EX 0`; round sub-second lifetimes up.
        let ttl_secs = ttl.as_secs().max(1).to_string();
        self.command(&["SET", key.as_str(), value, "EX", &ttl_secs])
            .await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "upstash-rest"
    }
}
