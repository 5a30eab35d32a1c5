// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0
#![allow(missing_docs, dead_code)]

//! Tracker API test fixtures
//!
//! Envelope bodies and wiremock mounts for an `ajax.php` stand-in, plus
//! pipeline builders wired to the mock server.

use std::{sync::Arc, time::Duration};

use serde_json::{Value, json};
use shared_types::Indexer;
use tracker_api::{CredentialProvider, RateLimitConfig, ResponseCache};
use tracker_client::{
    ApiKey, CachedFetcher, ConfiguredCredentials, IndexerLimiters, RequestExecutor, TrackerClient,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path, query_param},
};

pub const TEST_API_KEY: &str = "test-api-key";
pub const AJAX_PATH: &str = "/ajax.php";

/// API base pointing at the mock server
pub fn api_base(server: &MockServer) -> String {
    format!("{}{AJAX_PATH}", server.uri())
}

/// Successful `action=torrent` envelope
pub fn torrent_envelope(id: u64, release_name: &str, username: &str) -> Value {
    json!({
        "status": "success",
        "response": {
            "torrent": {
                "id": id,
                "release_name": release_name,
                "username": username
            }
        }
    })
}

/// Failure envelope as the tracker reports it
pub fn failure_envelope(message: &str) -> Value {
    json!({
        "status": "failure",
        "error": message
    })
}

/// Mount a GET for `action` and `id` that answers with `template`
pub async fn mount_action(
    server: &MockServer,
    action: &str,
    id: u64,
    template: ResponseTemplate,
    expected_calls: u64,
) {
    Mock::given(method("GET"))
        .and(path(AJAX_PATH))
        .and(query_param("action", action))
        .and(query_param("id", id.to_string()))
        .and(header("Authorization", TEST_API_KEY))
        .respond_with(template)
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Mount a catch-all that must never be hit
pub async fn mount_unreachable(server: &MockServer) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(torrent_envelope(0, "", "")))
        .expect(0)
        .mount(server)
        .await;
}

/// Limits large enough that no test trips them
pub fn generous_limiters() -> Arc<IndexerLimiters> {
    Arc::new(IndexerLimiters::from_configs(Indexer::all().iter().map(
        |&indexer| {
            (
                indexer,
                RateLimitConfig {
                    burst: 100,
                    period_seconds: 1,
                },
            )
        },
    )))
}

/// Limiters that admit nothing
pub fn exhausted_limiters() -> Arc<IndexerLimiters> {
    Arc::new(IndexerLimiters::from_configs(Indexer::all().iter().map(
        |&indexer| {
            (
                indexer,
                RateLimitConfig {
                    burst: 0,
                    period_seconds: 3600,
                },
            )
        },
    )))
}

/// The test key configured for every indexer
pub fn test_credentials() -> ConfiguredCredentials {
    Indexer::all()
        .iter()
        .fold(ConfiguredCredentials::new(), |credentials, &indexer| {
            credentials.with_key(indexer, ApiKey::new(TEST_API_KEY).unwrap())
        })
}

pub fn client_with(limiters: Arc<IndexerLimiters>, timeout: Duration) -> TrackerClient {
    TrackerClient::new(RequestExecutor::with_timeout(timeout).unwrap(), limiters)
}

pub fn fetcher_with(
    client: TrackerClient,
    credentials: Arc<dyn CredentialProvider>,
    cache: Arc<dyn ResponseCache>,
) -> CachedFetcher {
    CachedFetcher::new(client, credentials, cache)
}
