//! tmdb-proxy: serve the cache-aside TMDB proxy over HTTP.
//!
//! Usage:
//!   tmdb-proxy              Start the server (configuration from environment)
//!   tmdb-proxy --version    Show version information
//!   tmdb-proxy --help       Show this help message

use anyhow::Context;
use tmdb_cache_proxy::{server, utils::init_tracing, ProxyConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match std::env::args().nth(1).as_deref() {
        Some("version" | "--version" | "-V") => {
            println!("tmdb-proxy {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Some("help" | "--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(other) => {
            eprintln!("Unknown argument: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
        None => {}
    }

    init_tracing();

    let config = ProxyConfig::from_env().context("loading configuration from environment")?;
    tracing::debug!(?config, "configuration loaded");

    server::run(config).await.context("proxy server failed")?;
    Ok(())
}

fn print_usage() {
    println!(
        r#"tmdb-proxy: cache-aside proxy for the TMDB API

USAGE:
    tmdb-proxy [--version | --help]

ENVIRONMENT:
    TMDB_ACCESS_TOKEN                 TMDB bearer token (required)
    UPSTASH_REDIS_REST_URL            Redis REST endpoint (optional; memory cache otherwise)
    UPSTASH_REDIS_REST_TOKEN          Redis REST token
    TMDB_PROXY_LISTEN                 Listen address (default 127.0.0.1:3000)
    TMDB_PROXY_MOUNT                  Mount prefix (default /api/tmdb/)
    TMDB_PROXY_BASE_URL               Upstream base URL (default https://api.themoviedb.org/3)
    TMDB_PROXY_CACHE_TTL_SECS         Cache entry lifetime (default 3600, 0 disables caching)
    TMDB_PROXY_CACHE_PREFIX           Cache key namespace (default tmdb)
    TMDB_PROXY_HTTP_TIMEOUT_SECS      Outbound request timeout (default 30)
    TMDB_PROXY_MEMORY_CACHE_ENTRIES   Memory cache capacity (default 10000)
    RUST_LOG                          Log filter (default info,tmdb_cache_proxy=debug)"#
    );
}
