//! # Cache-Aside Proxy
//!
//! One request in, one response out:
//!
//! 1. `OPTIONS` answers 200 with an empty body (CORS preflight).
//! 2. The cache key is derived from the resource path and query.
//! 3. A cache hit is returned as-is.
//! 4. On a miss the upstream is called; success is cached with the TTL and
//!    returned, failure becomes `{"error", "details"}` with the upstream status.
//!
//! Cache problems never fail a request. Every response carries the CORS
//! headers in [`CORS_HEADERS`].

mod handler;
mod request;
mod response;

pub use handler::CacheAsideProxy;
pub use request::ProxyRequest;
pub use response::{ErrorBody, ProxyResponse, ResponseBody, CORS_HEADERS};
