// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the tracker lookup and health endpoints

use axum::http::StatusCode;
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path, query_param},
};

mod fixtures;
use fixtures::*;

async fn get_json(url: String) -> (StatusCode, Value) {
    let response = reqwest::Client::new()
        .get(url)
        .send()
        .await
        .expect("Failed to send request");
    let status = response.status();
    let body = response.json().await.expect("Failed to read response");
    (status, body)
}

#[tokio::test]
async fn health_lists_indexers() {
    let tracker = MockServer::start().await;
    let (addr, token) = start_gateway(&tracker, Some(TRACKER_KEY), 5).await;

    let response = reqwest::get(format!("http://{addr}/health"))
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let body: Value = response.json().await.expect("Failed to read response");
    assert_eq!(body["status"], "Up");
    assert_eq!(body["environment"], "testing");
    assert_eq!(body["indexers"][0]["indexer"], "redacted");
    assert_eq!(body["indexers"][0]["api_key_configured"], true);
    assert_eq!(body["indexers"][0]["rate_limit"]["burst"], 5);
    assert_eq!(body["indexers"][1]["indexer"], "ops");
    assert_eq!(body["cache"]["entry_count"], 0);

    token.cancel();
}

#[tokio::test]
async fn lookup_is_cached_across_requests() {
    let tracker = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ajax.php"))
        .and(query_param("action", "torrent"))
        .and(query_param("id", "42"))
        .and(header("Authorization", TRACKER_KEY))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(torrent_envelope(42, "Foo &amp; Bar")),
        )
        .expect(1)
        .mount(&tracker)
        .await;

    let (addr, token) = start_gateway(&tracker, Some(TRACKER_KEY), 5).await;

    for _ in 0..2 {
        let (status, body) = get_json(format!("http://{addr}/v1/redacted/torrent/42")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, torrent_envelope(42, "Foo &amp; Bar"));
    }

    let (_, health) = get_json(format!("http://{addr}/health")).await;
    assert_eq!(health["cache"]["entry_count"], 1);
    assert_eq!(health["cache"]["cache_hits"], 1);

    token.cancel();
}

#[tokio::test]
async fn api_key_header_overrides_configuration() {
    let tracker = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("Authorization", "from-header"))
        .respond_with(ResponseTemplate::new(200).set_body_json(torrent_envelope(7, "X")))
        .expect(1)
        .mount(&tracker)
        .await;

    let (addr, token) = start_gateway(&tracker, None, 5).await;

    let response = reqwest::Client::new()
        .get(format!("http://{addr}/v1/redacted/torrent/7"))
        .header("X-Api-Key", "from-header")
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    token.cancel();
}

#[tokio::test]
async fn unknown_indexer_is_bad_request() {
    let tracker = MockServer::start().await;
    let (addr, token) = start_gateway(&tracker, Some(TRACKER_KEY), 5).await;

    let (status, body) = get_json(format!("http://{addr}/v1/btn/torrent/1")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert!(
        body["error"]
            .as_str()
            .is_some_and(|e| e.contains("invalid indexer: btn"))
    );

    token.cancel();
}

#[tokio::test]
async fn missing_credentials_is_unauthorized() {
    let tracker = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&tracker)
        .await;

    let (addr, token) = start_gateway(&tracker, None, 5).await;

    let (status, _) = get_json(format!("http://{addr}/v1/redacted/torrent/1")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    token.cancel();
}

#[tokio::test]
async fn tracker_failure_is_bad_gateway() {
    let tracker = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "failure", "error": "bad id parameter"})),
        )
        .expect(1)
        .mount(&tracker)
        .await;

    let (addr, token) = start_gateway(&tracker, Some(TRACKER_KEY), 5).await;

    let (status, body) = get_json(format!("http://{addr}/v1/redacted/torrent/99")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let message = body["error"].as_str().unwrap_or_default();
    assert!(message.contains("error fetching torrent data for ID 99"));
    assert!(message.contains("bad id parameter"));

    token.cancel();
}

#[tokio::test]
async fn exhausted_limit_is_too_many_requests() {
    let tracker = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(torrent_envelope(1, "One")))
        .expect(1)
        .mount(&tracker)
        .await;

    let (addr, token) = start_gateway(&tracker, Some(TRACKER_KEY), 1).await;

    let (first, _) = get_json(format!("http://{addr}/v1/redacted/torrent/1")).await;
    let (second, _) = get_json(format!("http://{addr}/v1/redacted/torrent/2")).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);

    token.cancel();
}
