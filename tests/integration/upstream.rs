//! HttpUpstream against a mock TMDB

use crate::mock_server::{MockServerFixture, TEST_TOKEN};
use mockito::Matcher;
use serde_json::json;
use std::time::Duration;
use tmdb_cache_proxy::transport::{build_client, HttpUpstream, UpstreamApi};

fn upstream(base_url: &str) -> HttpUpstream {
    let client = build_client(Duration::from_secs(5)).unwrap();
    HttpUpstream::new(client, base_url, TEST_TOKEN)
}

#[tokio::test]
async fn fetch_sends_bearer_and_decodes_json() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_tmdb("/movie/550", 200, r#"{"id":550,"title":"Fight Club"}"#)
        .await;

    let value = upstream(&fixture.base_url)
        .fetch_json("movie/550", &[])
        .await
        .unwrap();

    assert_eq!(value, json!({"id": 550, "title": "Fight Club"}));
    mock.assert_async().await;
}

#[tokio::test]
async fn fetch_forwards_query_parameters() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", Matcher::Regex(r"^/search/movie".to_string()))
        .match_header("authorization", format!("Bearer {TEST_TOKEN}").as_str())
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("query".into(), "fight club".into()),
            Matcher::UrlEncoded("page".into(), "2".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"page":2,"results":[]}"#)
        .create_async()
        .await;

    let query = vec![
        ("query".to_string(), "fight club".to_string()),
        ("page".to_string(), "2".to_string()),
    ];
    let value = upstream(&fixture.base_url)
        .fetch_json("search/movie", &query)
        .await
        .unwrap();

    assert_eq!(value["page"], json!(2));
    mock.assert_async().await;
}

#[tokio::test]
async fn non_success_status_carries_status_and_details() {
    let mut fixture = MockServerFixture::new().await;
    fixture
        .mock_tmdb(
            "/movie/0",
            404,
            r#"{"status_code":34,"status_message":"The resource you requested could not be found."}"#,
        )
        .await;

    let err = upstream(&fixture.base_url)
        .fetch_json("movie/0", &[])
        .await
        .unwrap_err();

    assert_eq!(err.status, Some(404));
    assert_eq!(err.client_status(), 404);
    assert_eq!(err.message, "Request failed with status code 404");
    assert_eq!(err.details.unwrap()["status_code"], json!(34));
}

#[tokio::test]
async fn invalid_json_body_has_no_status() {
    let mut fixture = MockServerFixture::new().await;
    fixture.mock_tmdb("/movie/550", 200, "<html>oops</html>").await;

    let err = upstream(&fixture.base_url)
        .fetch_json("movie/550", &[])
        .await
        .unwrap_err();

    assert_eq!(err.status, None);
    assert_eq!(err.client_status(), 500);
    assert_eq!(err.details, Some(json!("<html>oops</html>")));
}

#[tokio::test]
async fn unreachable_upstream_reports_500() {
    // Nothing listens on the discard port.
    let err = upstream("http://127.0.0.1:9")
        .fetch_json("movie/550", &[])
        .await
        .unwrap_err();

    assert_eq!(err.status, None);
    assert_eq!(err.client_status(), 500);
    assert!(err.details.is_none());
}
