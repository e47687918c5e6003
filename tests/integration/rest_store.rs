//! RestCacheStore against a mock Redis REST endpoint

use crate::mock_server::{MockServerFixture, STORE_TOKEN};
use serde_json::json;
use std::time::Duration;
use tmdb_cache_proxy::cache::{CacheError, CacheKey, CacheStore, RestCacheStore};
use tmdb_cache_proxy::transport::build_client;

fn store(url: &str) -> RestCacheStore {
    let client = build_client(Duration::from_secs(5)).unwrap();
    RestCacheStore::new(client, url, STORE_TOKEN)
}

#[tokio::test]
async fn get_returns_stored_string() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_store_command(
            json!(["GET", "tmdb:movie/550"]),
            200,
            json!({"result": "{\"id\":550}"}),
        )
        .await;

    let value = store(&fixture.base_url)
        .get(&CacheKey::new("tmdb:movie/550"))
        .await
        .unwrap();

    assert_eq!(value.as_deref(), Some("{\"id\":550}"));
    mock.assert_async().await;
}

#[tokio::test]
async fn get_of_missing_key_is_none() {
    let mut fixture = MockServerFixture::new().await;
    fixture
        .mock_store_command(json!(["GET", "tmdb:movie/551"]), 200, json!({"result": null}))
        .await;

    let value = store(&fixture.base_url)
        .get(&CacheKey::new("tmdb:movie/551"))
        .await
        .unwrap();

    assert_eq!(value, None);
}

#[tokio::test]
async fn set_sends_value_with_expiry() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_store_command(
            json!(["SET", "tmdb:movie/550", "{\"id\":550}", "EX", "3600"]),
            200,
            json!({"result": "OK"}),
        )
        .await;

    store(&fixture.base_url)
        .set(
            &CacheKey::new("tmdb:movie/550"),
            "{\"id\":550}",
            Duration::from_secs(3600),
        )
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn error_reply_becomes_store_error() {
    let mut fixture = MockServerFixture::new().await;
    fixture
        .mock_store_command(
            json!(["GET", "tmdb:movie/550"]),
            401,
            json!({"error": "WRONGPASS invalid password"}),
        )
        .await;

    let err = store(&fixture.base_url)
        .get(&CacheKey::new("tmdb:movie/550"))
        .await
        .unwrap_err();

    match err {
        CacheError::Store(message) => assert!(message.contains("WRONGPASS")),
        other => panic!("expected store error, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_store_is_http_error() {
    let err = store("http://127.0.0.1:9")
        .get(&CacheKey::new("tmdb:movie/550"))
        .await
        .unwrap_err();

    assert!(matches!(err, CacheError::Http(_)));
}

#[tokio::test]
async fn decoded_result_is_reserialized() {
    let mut fixture = MockServerFixture::new().await;
    fixture
        .mock_store_command(
            json!(["GET", "tmdb:movie/550"]),
            200,
            json!({"result": {"id": 550}}),
        )
        .await;

    let value = store(&fixture.base_url)
        .get(&CacheKey::new("tmdb:movie/550"))
        .await
        .unwrap();

    assert_eq!(value.as_deref(), Some(r#"{"id":550}"#));
}

#[tokio::test]
async fn failed_status_without_error_field_is_store_error() {
    let mut fixture = MockServerFixture::new().await;
    fixture
        .mock_store_command(json!(["GET", "tmdb:movie/550"]), 503, json!({"result": null}))
        .await;

    let err = store(&fixture.base_url)
        .get(&CacheKey::new("tmdb:movie/550"))
        .await
        .unwrap_err();

    match err {
        CacheError::Store(message) => assert!(message.starts_with("HTTP 503")),
        other => panic!("expected store error, got {other:?}"),
    }
}

#[tokio::test]
async fn zero_ttl_sends_no_command() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/")
        .expect(0)
        .create_async()
        .await;

    store(&fixture.base_url)
        .set(&CacheKey::new("tmdb:movie/550"), "{\"id\":550}", Duration::ZERO)
        .await
        .unwrap();

    mock.assert_async().await;
}
