//! Upstream API access over HTTP.

mod http;

pub use http::{build_client, HttpUpstream, TransportError, UpstreamApi, UpstreamError};
