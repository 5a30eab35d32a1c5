// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Rate-gated, time-bounded execution of a single tracker API call
//!
//! [`RequestExecutor::execute`] performs exactly one outbound GET per admitted
//! call: it takes a limiter token, sends the request with the raw API key in the
//! `Authorization` header, reads the whole body, decodes the envelope and
//! rejects any status other than `success`.

use std::time::Duration;

use reqwest::{Client, header::AUTHORIZATION};
use shared_types::Indexer;
use tokio::time::timeout;
use tracing::{debug, error, warn};
use tracker_api::{RateLimit, ResponseData, TrackerError, TrackerResult};

/// Bound applied to one call, from request start through body read
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("tracker-gateway/", env!("CARGO_PKG_VERSION"));

/// Executes single tracker API requests
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    client: Client,
    timeout: Duration,
}

impl RequestExecutor {
    /// Create an executor with the default 10 second bound
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Transport`] if the HTTP client cannot be built
    pub fn new() -> TrackerResult<Self> {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create an executor with a custom bound
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Transport`] if the HTTP client cannot be built
    pub fn with_timeout(timeout: Duration) -> TrackerResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(TrackerError::transport)?;

        Ok(Self { client, timeout })
    }

    /// Bound applied to each call
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Perform one request against `endpoint`
    ///
    /// A limiter token is consumed before anything else and is not returned if
    /// the call later fails. A denied token fails without touching the network.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::RateLimited`] when `limiter` has no token
    /// - [`TrackerError::Timeout`] when the bound elapses
    /// - [`TrackerError::Transport`] for send or body read failures
    /// - [`TrackerError::Decode`] for a body that is not valid JSON or not an envelope
    /// - [`TrackerError::Api`] when the envelope status is not `success`
    pub async fn execute(
        &self,
        endpoint: &str,
        api_key: &str,
        limiter: &dyn RateLimit,
        indexer: Indexer,
    ) -> TrackerResult<ResponseData> {
        if !limiter.allow() {
            warn!(indexer = %indexer, "rate limit reached, request not sent");
            return Err(TrackerError::RateLimited { indexer });
        }

        debug!(endpoint, indexer = %indexer, "sending tracker API request");

        let request = self
            .client
            .get(endpoint)
            .header(AUTHORIZATION, api_key)
            .send();

        let body = timeout(self.timeout, async {
            let response = request.await?;
            debug!(
                endpoint,
                status = response.status().as_u16(),
                "received tracker API response"
            );
            response.bytes().await
        })
        .await
        .map_err(|_| TrackerError::Timeout {
            timeout: self.timeout,
        })
        .and_then(|result| result.map_err(|e| self.classify(e)))
        .inspect_err(|e| {
            error!(endpoint, indexer = %indexer, error = %e, "tracker API request failed");
        })?;

        // A `null` body decodes to an empty envelope and fails the status check.
        let data = serde_json::from_slice::<Option<ResponseData>>(&body)
            .map_err(|source| TrackerError::Decode { source })
            .inspect_err(|e| {
                error!(endpoint, indexer = %indexer, error = %e, "could not decode tracker response");
            })?
            .unwrap_or_default();

        if !data.is_success() {
            warn!(
                indexer = %indexer,
                status = %data.status,
                message = data.error_message(),
                "tracker API reported an error"
            );
            return Err(TrackerError::Api {
                indexer,
                message: data.error_message().to_string(),
            });
        }

        Ok(data)
    }

    fn classify(&self, error: reqwest::Error) -> TrackerError {
        if error.is_timeout() {
            TrackerError::Timeout {
                timeout: self.timeout,
            }
        } else {
            TrackerError::transport(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tracker_api::ErrorKind;

    use super::*;

    struct Deny;

    impl RateLimit for Deny {
        fn allow(&self) -> bool {
            false
        }
    }

    #[derive(Default)]
    struct Counting(AtomicUsize);

    impl RateLimit for Counting {
        fn allow(&self) -> bool {
            self.0.fetch_add(1, Ordering::SeqCst);
            true
        }
    }

    #[test]
    fn default_timeout_is_ten_seconds() {
        let executor = RequestExecutor::new().unwrap();
        assert_eq!(executor.timeout(), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn denied_admission_is_rate_limited() {
        let executor = RequestExecutor::new().unwrap();
        let error = executor
            .execute("http://127.0.0.1:9/ajax.php", "key", &Deny, Indexer::Orpheus)
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::RateLimited);
        assert_eq!(error.to_string(), "ops: too many requests");
    }

    #[tokio::test]
    async fn token_consumed_even_when_transport_fails() {
        let executor = RequestExecutor::with_timeout(Duration::from_secs(2)).unwrap();
        let limiter = Counting::default();

        let error = executor
            .execute("not a url", "key", &limiter, Indexer::Redacted)
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Transport);
        assert_eq!(limiter.0.load(Ordering::SeqCst), 1);
    }
}
