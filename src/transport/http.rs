use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Read-only capability the proxy needs from the upstream API.
#[async_trait]
pub trait UpstreamApi: Send + Sync {
    /// GET `path` with `query` appended in the given order and decode the JSON body.
    async fn fetch_json(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> std::result::Result<Value, UpstreamError>;
}

/// Build the shared reqwest client used for both the upstream API and the
/// cache store REST endpoint.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(32)
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .user_agent(concat!("tmdb-cache-proxy/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(TransportError::from)?;
    Ok(client)
}

pub struct HttpUpstream {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpUpstream {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Append the decoded resource path to the base URL, one encoded segment
    /// per `/`-separated part.
    fn resource_url(&self, path: &str) -> std::result::Result<Url, UpstreamError> {
        let invalid = |reason: String| UpstreamError {
            status: None,
            message: format!("invalid upstream URL {}: {reason}", self.base_url),
            details: None,
        };

        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }
}

#[async_trait]
impl UpstreamApi for HttpUpstream {
    async fn fetch_json(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> std::result::Result<Value, UpstreamError> {
        let url = self.resource_url(path)?;
        let mut request = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header("accept", "application/json");

        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await.map_err(UpstreamError::transport)?;
        let status = response.status();
        let body = response.text().await.map_err(UpstreamError::transport)?;

        if !status.is_success() {
            return Err(UpstreamError::from_status(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| UpstreamError {
            status: None,
            message: format!("upstream returned invalid JSON: {e}"),
            details: non_empty_body(&body),
        })
    }
}

/// Failure of a single upstream call, carrying what the client will see.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct UpstreamError {
    /// HTTP status returned by the upstream, if it answered at all.
    pub status: Option<u16>,
    pub message: String,
    /// Upstream response body: JSON when it parses, otherwise the raw text.
    pub details: Option<Value>,
}

impl UpstreamError {
    pub fn from_status(status: u16, body: &str) -> Self {
        Self {
            status: Some(status),
            message: format!("Request failed with status code {status}"),
            details: non_empty_body(body),
        }
    }

    pub fn transport(err: reqwest::Error) -> Self {
        Self {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
            details: None,
        }
    }

    /// Status to report to the client: the upstream's own, or 500.
    pub fn client_status(&self) -> u16 {
        self.status.unwrap_or(500)
    }
}

fn non_empty_body(body: &str) -> Option<Value> {
    if body.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string())))
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
