// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Cache-first fetch of tracker data
//!
//! A cache hit is returned as-is with no freshness check. Only successful
//! envelopes are stored, so a failed fetch leaves the cache untouched and the
//! next call for the same key goes back to the live API.

use std::{fmt, sync::Arc};

use tracing::{debug, error};
use tracker_api::{
    CacheKey, CredentialProvider, RequestData, ResponseCache, ResponseData, TrackerError,
    TrackerResult,
};

use crate::TrackerClient;

/// Cached fetch over a [`TrackerClient`]
#[derive(Clone)]
pub struct CachedFetcher {
    client: TrackerClient,
    credentials: Arc<dyn CredentialProvider>,
    cache: Arc<dyn ResponseCache>,
}

impl fmt::Debug for CachedFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedFetcher")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl CachedFetcher {
    /// Create a fetcher from its collaborators
    pub fn new(
        client: TrackerClient,
        credentials: Arc<dyn CredentialProvider>,
        cache: Arc<dyn ResponseCache>,
    ) -> Self {
        Self {
            client,
            credentials,
            cache,
        }
    }

    /// Fetch `action` for `id`, serving from cache when possible
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::FetchFailed`] wrapping a credential failure or the
    /// orchestrator's error. Nothing is cached on failure.
    pub async fn fetch(
        &self,
        request: &RequestData,
        id: u64,
        action: &str,
        api_base: &str,
    ) -> TrackerResult<ResponseData> {
        let indexer = request.indexer;
        let key = CacheKey::new(indexer, action, id);

        if let Some(cached) = self.cache.get(&key) {
            debug!(key = %key, "serving tracker data from cache");
            return Ok(cached);
        }

        let wrap = |source: TrackerError| {
            error!(indexer = %indexer, action, id, error = %source, "fetch failed");
            TrackerError::FetchFailed {
                indexer,
                action: action.to_string(),
                id,
                source: Box::new(source),
            }
        };

        let api_key = self.credentials.api_key(request).map_err(wrap)?;

        let data = self
            .client
            .initiate(id, action, &api_key, api_base, indexer)
            .await
            .map_err(wrap)?;

        debug!(key = %key, "caching tracker data");
        self.cache.put(key, data.clone());

        Ok(data)
    }

    /// Fetch using the indexer's compiled-in API base
    ///
    /// # Errors
    ///
    /// Same as [`CachedFetcher::fetch`].
    pub async fn fetch_indexer(
        &self,
        request: &RequestData,
        id: u64,
        action: &str,
    ) -> TrackerResult<ResponseData> {
        self.fetch(request, id, action, request.indexer.api_base())
            .await
    }
}
