// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Request orchestration for the tracker `ajax.php` API
//!
//! [`TrackerClient`] is the only component that knows the endpoint query shape
//! (`<base>?action=<action>&id=<id>`). It pairs each call with the indexer's
//! long-lived limiter and hands it to the [`RequestExecutor`].

use std::{fmt, sync::Arc};

use shared_types::Indexer;
use tracing::{debug, error, warn};
use tracker_api::{ActionPayload, LimiterRegistry, ResponseData, TrackerError, TrackerResult};
use url::form_urlencoded::byte_serialize;

use crate::RequestExecutor;

/// Build the query endpoint for `action` and `id`
///
/// The action is percent-encoded as a query component; plain tokens such as
/// `torrent` pass through unchanged.
pub fn endpoint(api_base: &str, action: &str, id: u64) -> String {
    let action: String = byte_serialize(action.as_bytes()).collect();
    format!("{api_base}?action={action}&id={id}")
}

/// Orchestrates single tracker API calls
#[derive(Clone)]
pub struct TrackerClient {
    executor: RequestExecutor,
    limiters: Arc<dyn LimiterRegistry>,
}

impl fmt::Debug for TrackerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerClient")
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

impl TrackerClient {
    /// Create a client from an executor and a limiter registry
    pub fn new(executor: RequestExecutor, limiters: Arc<dyn LimiterRegistry>) -> Self {
        Self { executor, limiters }
    }

    /// Executor used for outbound calls
    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    /// Request `action` for `id` from the API at `api_base`
    ///
    /// # Errors
    ///
    /// - [`TrackerError::LimiterUnavailable`] when `indexer` has no limiter
    /// - [`TrackerError::InitiationFailed`] wrapping any executor failure
    pub async fn initiate(
        &self,
        id: u64,
        action: &str,
        api_key: &str,
        api_base: &str,
        indexer: Indexer,
    ) -> TrackerResult<ResponseData> {
        let Some(limiter) = self.limiters.limiter(indexer) else {
            error!(indexer = %indexer, "could not get rate limiter for indexer");
            return Err(TrackerError::LimiterUnavailable { indexer });
        };

        let endpoint = endpoint(api_base, action, id);

        let data = self
            .executor
            .execute(&endpoint, api_key, limiter.as_ref(), indexer)
            .await
            .map_err(|source| {
                error!(endpoint, indexer = %indexer, error = %source, "request initiation failed");
                TrackerError::InitiationFailed {
                    endpoint: endpoint.clone(),
                    source: Box::new(source),
                }
            })?;

        match data.payload_for(action) {
            Ok(Some(ActionPayload::Torrent(torrent))) => debug!(
                indexer = %indexer,
                id,
                torrent_id = torrent.id,
                release_name = %torrent.display_release_name(),
                uploader = %torrent.username,
                "fetched torrent"
            ),
            Ok(_) => debug!(indexer = %indexer, action, id, "fetched tracker data"),
            Err(e) => warn!(
                indexer = %indexer,
                action,
                id,
                error = %e,
                "payload does not match the expected shape for action"
            ),
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use tracker_api::{ErrorKind, RateLimit};

    use super::*;

    struct NoLimiters;

    impl LimiterRegistry for NoLimiters {
        fn limiter(&self, _indexer: Indexer) -> Option<Arc<dyn RateLimit>> {
            None
        }
    }

    #[test]
    fn endpoint_shape() {
        assert_eq!(
            endpoint("https://redacted.sh/ajax.php", "torrent", 42),
            "https://redacted.sh/ajax.php?action=torrent&id=42"
        );
        assert_eq!(
            endpoint("https://orpheus.network/ajax.php", "torrentgroup", 0),
            "https://orpheus.network/ajax.php?action=torrentgroup&id=0"
        );
    }

    #[test]
    fn endpoint_encodes_unsafe_action() {
        assert_eq!(
            endpoint("http://t/ajax.php", "a&b=c", u64::MAX),
            "http://t/ajax.php?action=a%26b%3Dc&id=18446744073709551615"
        );
    }

    #[tokio::test]
    async fn missing_limiter_is_not_wrapped() {
        let client = TrackerClient::new(RequestExecutor::new().unwrap(), Arc::new(NoLimiters));

        let error = client
            .initiate(1, "torrent", "key", "http://127.0.0.1:9/ajax.php", Indexer::Redacted)
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::LimiterUnavailable);
        assert_eq!(
            error.to_string(),
            "could not get rate limiter for indexer: redacted"
        );
    }
}
