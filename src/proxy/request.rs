use http::Method;
use percent_encoding::percent_decode_str;
use url::form_urlencoded;

/// Inbound request reduced to what the proxy acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRequest {
    pub method: Method,
    /// Upstream resource path, without the mount prefix or surrounding slashes.
    pub path: String,
    /// Decoded query pairs in the order the client sent them.
    pub query: Vec<(String, String)>,
}

impl ProxyRequest {
    pub fn new(method: Method, path: impl Into<String>, query: Vec<(String, String)>) -> Self {
        Self {
            method,
            path: path.into().trim_matches('/').to_string(),
            query,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path, Vec::new())
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Parse a raw request URL (`/api/tmdb/movie/550?language=en-US`).
    ///
    /// The resource path is whatever follows the mount prefix, which must
    /// start the URL. A URL outside the mount is taken whole, minus its
    /// leading slash. Path segments are percent-decoded so the result matches
    /// [`ProxyRequest::from_segments`] fed with router-decoded segments.
    pub fn from_url(method: Method, url: &str, mount_prefix: &str) -> Self {
        let url = url.split_once('#').map_or(url, |(before, _)| before);
        let (path, query) = url.split_once('?').unwrap_or((url, ""));

        Self {
            method,
            path: decode_path(strip_mount(path, mount_prefix)),
            query: parse_query(query),
        }
    }

    /// Build from route segments captured by a router (`["movie", "550"]`).
    pub fn from_segments<I, S>(method: Method, segments: I, query: Vec<(String, String)>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let path = segments
            .into_iter()
            .map(|s| s.as_ref().trim_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        Self::new(method, path, query)
    }

    /// Query string as forwarded upstream, in client order.
    pub fn query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.query)
            .finish()
    }
}

fn strip_mount<'a>(path: &'a str, mount_prefix: &str) -> &'a str {
    let mount = mount_prefix.trim_end_matches('/');
    match path.strip_prefix(mount) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_matches('/'),
        _ => path.trim_matches('/'),
    }
}

fn decode_path(path: &str) -> String {
    percent_decode_str(path).decode_utf8_lossy().into_owned()
}

fn parse_query(query: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}
