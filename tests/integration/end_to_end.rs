//! Full HTTP round trips through the hyper server

use crate::mock_server::{MockServerFixture, STORE_TOKEN, TEST_TOKEN};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tmdb_cache_proxy::cache::{CacheConfig, CacheKeyGenerator, CacheManager, MemoryCache};
use tmdb_cache_proxy::server;
use tmdb_cache_proxy::transport::{build_client, HttpUpstream};
use tmdb_cache_proxy::{CacheAsideProxy, ProxyConfig};
use tokio::net::TcpListener;

const MOUNT: &str = "/api/tmdb/";

async fn spawn_proxy(proxy: CacheAsideProxy) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, Arc::new(proxy), MOUNT.to_string()));
    addr
}

fn memory_backed_proxy(upstream_url: &str) -> CacheAsideProxy {
    let client = build_client(Duration::from_secs(5)).unwrap();
    CacheAsideProxy::new(
        CacheKeyGenerator::new(),
        CacheManager::new(CacheConfig::new(), Arc::new(MemoryCache::new(128))),
        Arc::new(HttpUpstream::new(client, upstream_url, TEST_TOKEN)),
    )
}

fn assert_cors(resp: &reqwest::Response) {
    let headers = resp.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert!(headers.contains_key("access-control-allow-methods"));
    assert!(headers.contains_key("access-control-allow-headers"));
}

#[tokio::test]
async fn second_get_is_served_from_cache() {
    let mut fixture = MockServerFixture::new().await;
    let tmdb = fixture
        .server
        .mock("GET", "/movie/550")
        .with_status(200)
        .with_body(r#"{"id":550,"title":"Fight Club"}"#)
        .expect(1)
        .create_async()
        .await;

    let addr = spawn_proxy(memory_backed_proxy(&fixture.base_url)).await;
    let client = reqwest::Client::new();
    let url = format!("http://{addr}/api/tmdb/movie/550");

    for _ in 0..2 {
        let resp = client.get(&url).send().await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_cors(&resp);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body, json!({"id": 550, "title": "Fight Club"}));
    }

    tmdb.assert_async().await;
}

#[tokio::test]
async fn preflight_is_answered_locally() {
    let mut fixture = MockServerFixture::new().await;
    let tmdb = fixture
        .server
        .mock("GET", mockito::Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let addr = spawn_proxy(memory_backed_proxy(&fixture.base_url)).await;
    let resp = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("http://{addr}/api/tmdb/movie/550"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_cors(&resp);
    assert!(resp.text().await.unwrap().is_empty());
    tmdb.assert_async().await;
}

#[tokio::test]
async fn paths_outside_the_mount_are_not_found() {
    let fixture = MockServerFixture::new().await;
    let addr = spawn_proxy(memory_backed_proxy(&fixture.base_url)).await;

    let resp = reqwest::get(format!("http://{addr}/healthz")).await.unwrap();

    assert_eq!(resp.status(), 404);
    assert_cors(&resp);
}

#[tokio::test]
async fn upstream_error_status_reaches_the_client() {
    let mut fixture = MockServerFixture::new().await;
    fixture
        .mock_tmdb("/movie/0", 404, r#"{"status_code":34}"#)
        .await;

    let addr = spawn_proxy(memory_backed_proxy(&fixture.base_url)).await;
    let resp = reqwest::get(format!("http://{addr}/api/tmdb/movie/0")).await.unwrap();

    assert_eq!(resp.status(), 404);
    assert_cors(&resp);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], json!("Request failed with status code 404"));
    assert_eq!(body["details"], json!({"status_code": 34}));
}

#[tokio::test]
async fn configured_proxy_writes_through_rest_store() {
    let mut fixture = MockServerFixture::new().await;
    let store_get = fixture
        .mock_store_command(
            json!(["GET", "tmdb:movie/550"]),
            200,
            json!({"result": null}),
        )
        .await;
    let store_set = fixture
        .mock_store_command(
            json!(["SET", "tmdb:movie/550", "{\"id\":550}", "EX", "3600"]),
            200,
            json!({"result": "OK"}),
        )
        .await;
    let tmdb = fixture.mock_tmdb("/movie/550", 200, r#"{"id":550}"#).await;

    let config = ProxyConfig::new(TEST_TOKEN)
        .with_upstream_base_url(fixture.base_url.clone())
        .with_cache_store(fixture.base_url.clone(), STORE_TOKEN);
    let proxy = CacheAsideProxy::from_config(&config).unwrap();
    let addr = spawn_proxy(proxy).await;

    let resp = reqwest::get(format!("http://{addr}/api/tmdb/movie/550")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"id": 550}));

    store_get.assert_async().await;
    store_set.assert_async().await;
    tmdb.assert_async().await;
}

#[tokio::test]
async fn zero_ttl_always_fetches_upstream() {
    let mut fixture = MockServerFixture::new().await;
    let store = fixture
        .server
        .mock("POST", "/")
        .expect(0)
        .create_async()
        .await;
    let tmdb = fixture
        .server
        .mock("GET", "/movie/550")
        .with_status(200)
        .with_body(r#"{"id":550}"#)
        .expect(2)
        .create_async()
        .await;

    let config = ProxyConfig::new(TEST_TOKEN)
        .with_upstream_base_url(fixture.base_url.clone())
        .with_cache_store(fixture.base_url.clone(), STORE_TOKEN)
        .with_cache_ttl(Duration::ZERO);
    let addr = spawn_proxy(CacheAsideProxy::from_config(&config).unwrap()).await;

    for _ in 0..2 {
        let resp = reqwest::get(format!("http://{addr}/api/tmdb/movie/550")).await.unwrap();
        assert_eq!(resp.status(), 200);
    }

    store.assert_async().await;
    tmdb.assert_async().await;
}
