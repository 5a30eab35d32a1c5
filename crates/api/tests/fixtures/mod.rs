// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0
#![allow(missing_docs, dead_code)]

//! Test fixtures for gateway integration tests
//!
//! Starts the gateway against a wiremock tracker so requests never leave the
//! machine.

use std::net::SocketAddr;

use api::{Indexer, IndexerSettings, Server, ServerConfig, ShutdownConfig};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::MockServer;

pub const TRACKER_KEY: &str = "configured-key";

/// Successful `action=torrent` envelope
pub fn torrent_envelope(id: u64, release_name: &str) -> Value {
    json!({
        "status": "success",
        "response": {
            "torrent": {"id": id, "release_name": release_name, "username": "alice"}
        }
    })
}

/// Settings pointing `indexer` at the mock tracker
pub fn mock_indexer(tracker: &MockServer, api_key: Option<&str>, burst: u32) -> IndexerSettings {
    IndexerSettings {
        api_key: api_key.map(ToString::to_string),
        burst: Some(burst),
        period_seconds: Some(3600),
        api_base: Some(
            Url::parse(&format!("{}/ajax.php", tracker.uri())).expect("valid mock server url"),
        ),
    }
}

/// Start a gateway with `redacted` routed to `tracker`
pub async fn start_gateway(
    tracker: &MockServer,
    api_key: Option<&str>,
    burst: u32,
) -> (SocketAddr, CancellationToken) {
    let config = ServerConfig::for_testing().with_indexer(
        Indexer::Redacted,
        mock_indexer(tracker, api_key, burst),
    );
    start_with(config).await
}

/// Start a gateway with an explicit configuration
pub async fn start_with(config: ServerConfig) -> (SocketAddr, CancellationToken) {
    Server::new(config, ShutdownConfig::default())
        .expect("Failed to create server")
        .run_for_testing()
        .await
        .expect("Failed to start test server")
}
