//! # tmdb-cache-proxy
//!
//! Cache-aside HTTP proxy for the TMDB API.
//!
//! ## Overview
//!
//! Clients call the proxy instead of TMDB. Each `GET` is turned into a cache
//! key built from the resource path and query; a hit is answered from the
//! cache store, a miss is fetched from TMDB with the server-side bearer token,
//! written back with a one-hour TTL and returned. `OPTIONS` preflights are
//! answered locally.
//!
//! ## Core Philosophy
//!
//! - **Cache is best-effort**: an unreachable store or a corrupt entry degrades to an upstream fetch
//! - **Upstream errors are surfaced**: the client sees the upstream status with `{error, details}`
//! - **Collaborators are traits**: [`cache::CacheStore`] and [`transport::UpstreamApi`] can be faked in tests
//! - **Configuration is explicit**: [`ProxyConfig`] is built once and injected
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tmdb_cache_proxy::{CacheAsideProxy, ProxyConfig, ProxyRequest};
//!
//! #[tokio::main]
//! async fn main() -> tmdb_cache_proxy::Result<()> {
//!     let config = ProxyConfig::from_env()?;
//!     let proxy = CacheAsideProxy::from_config(&config)?;
//!
//!     let response = proxy.handle(ProxyRequest::get("movie/550")).await;
//!     println!("{} {:?}", response.status, response.json_body());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`proxy`] | Request/response model and the cache-aside handler |
//! | [`cache`] | Cache keys, stores and the degrading cache manager |
//! | [`transport`] | Upstream API trait and its HTTP implementation |
//! | [`config`] | Process-wide configuration |
//! | [`server`] | HTTP/1.1 listener for the standalone binary |

pub mod cache;
pub mod config;
pub mod proxy;
pub mod server;
pub mod transport;
pub mod utils;

pub use config::ProxyConfig;
pub use proxy::{CacheAsideProxy, ProxyRequest, ProxyResponse};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
