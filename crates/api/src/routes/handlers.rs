// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP request handlers module

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, HeaderName},
};
use shared_types::Indexer;
use tracing::{debug, info};
use tracker_api::{RequestData, ResponseData, TrackerError};

use crate::{
    error::ServerError,
    state::{HealthCheck, ServerState},
};

/// Header carrying a per-request tracker API key
pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

/// Health check endpoint handler
pub async fn health_handler(State(state): State<ServerState>) -> Json<HealthCheck> {
    Json(state.health_check())
}

/// Fetch `action` for `id` from `indexer`
///
/// An `X-Api-Key` header overrides the key configured for the indexer. The
/// tracker envelope is returned as received.
///
/// # Errors
///
/// Returns `ServerError::Tracker` for an unknown indexer or a failed fetch.
pub async fn tracker_handler(
    State(state): State<ServerState>,
    Path((indexer, action, id)): Path<(String, String, u64)>,
    headers: HeaderMap,
) -> Result<Json<ResponseData>, ServerError> {
    let indexer: Indexer = indexer.parse().map_err(TrackerError::from)?;

    let mut request = RequestData::new(indexer);
    if let Some(key) = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        debug!(indexer = %indexer, "request supplied its own API key");
        request = request.with_api_key(key);
    }

    info!(indexer = %indexer, action, id, "tracker lookup");
    let data = state.pipeline().fetch(&request, id, &action).await?;

    Ok(Json(data))
}
