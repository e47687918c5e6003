//! HTTP/1.1 front for the proxy handler.
//!
//! Mounts [`CacheAsideProxy`] under the configured prefix. Anything outside
//! the mount gets a JSON 404 with the usual CORS headers.

use crate::config::ProxyConfig;
use crate::proxy::{CacheAsideProxy, ProxyRequest, ProxyResponse};
use crate::Result;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// Bind the configured address and serve until Ctrl-C.
pub async fn run(config: ProxyConfig) -> Result<()> {
    let proxy = Arc::new(CacheAsideProxy::from_config(&config)?);
    let listener = TcpListener::bind(&config.listen_addr).await?;
    info!(
        listen = %config.listen_addr,
        mount = %config.mount_prefix,
        "tmdb proxy listening"
    );

    tokio::select! {
        res = serve(listener, proxy, config.mount_prefix.clone()) => res,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            Ok(())
        }
    }
}

/// Accept connections forever, one task per connection.
pub async fn serve(listener: TcpListener, proxy: Arc<CacheAsideProxy>, mount_prefix: String) -> Result<()> {
    let mount_prefix: Arc<str> = Arc::from(mount_prefix);

    loop {
        let (stream, client_addr) = listener.accept().await?;
        let proxy = proxy.clone();
        let mount_prefix = mount_prefix.clone();

        tokio::spawn(async move {
            serve_connection(stream, client_addr, proxy, mount_prefix).await;
        });
    }
}

async fn serve_connection(
    stream: tokio::net::TcpStream,
    client_addr: SocketAddr,
    proxy: Arc<CacheAsideProxy>,
    mount_prefix: Arc<str>,
) {
    let io = TokioIo::new(stream);
    let service = service_fn(move |req: Request<Incoming>| {
        let proxy = proxy.clone();
        let mount_prefix = mount_prefix.clone();
        async move { Ok::<_, Infallible>(dispatch(req, &proxy, &mount_prefix).await) }
    });

    if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
        error!(client_addr = %client_addr, error = ?e, "connection error");
    } else {
        debug!(client_addr = %client_addr, "connection closed");
    }
}

async fn dispatch(
    req: Request<Incoming>,
    proxy: &CacheAsideProxy,
    mount_prefix: &str,
) -> Response<Full<Bytes>> {
    let request = {
        let uri = req.uri();
        if is_mounted(uri.path(), mount_prefix) {
            let target = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
            Some(ProxyRequest::from_url(req.method().clone(), target, mount_prefix))
        } else {
            None
        }
    };

    let response = match request {
        Some(request) => proxy.handle(request).await,
        None => ProxyResponse::not_found(),
    };
    into_http(response)
}

fn is_mounted(path: &str, mount_prefix: &str) -> bool {
    let mount = mount_prefix.trim_end_matches('/');
    match path.strip_prefix(mount) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Convert a handler response into a hyper response.
pub fn into_http(response: ProxyResponse) -> Response<Full<Bytes>> {
    let body = response.body_bytes();
    let mut http_response = Response::new(Full::new(body));
    *http_response.status_mut() = response.status;
    *http_response.headers_mut() = response.headers;
    http_response
}
