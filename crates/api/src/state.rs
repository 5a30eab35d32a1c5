// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Server state management module
//!
//! This module provides shared application state for the tracker gateway,
//! including configuration, the request pipeline, and coordinated cancellation.

use std::{collections::HashMap, sync::Arc};

use serde::{Deserialize, Serialize};
use shared_types::Indexer;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracker_api::{RateLimitConfig, RequestData, ResponseData};
use tracker_client::{
    ApiKey, CachedFetcher, ConfiguredCredentials, IndexerLimiters, RequestExecutor,
    ResponseCacheStats, ResponseDataCache, TrackerClient,
};

use crate::{
    config::{Environment, ServerConfig},
    error::{ServerError, ServerResult},
};

/// The tracker request pipeline and the collaborators it was built from
#[derive(Debug, Clone)]
pub struct TrackerPipeline {
    fetcher: CachedFetcher,
    cache: Arc<ResponseDataCache>,
    api_bases: HashMap<Indexer, String>,
}

impl TrackerPipeline {
    /// Build the pipeline described by `config`
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Config` for an unusable API key, or
    /// `ServerError::Tracker` if the HTTP client cannot be built.
    pub fn from_config(config: &ServerConfig) -> ServerResult<Self> {
        let executor = RequestExecutor::with_timeout(config.request_timeout_seconds.value())?;

        let limiters = IndexerLimiters::from_configs(
            Indexer::all()
                .iter()
                .map(|&indexer| (indexer, config.rate_limit(indexer))),
        );

        let mut credentials = ConfiguredCredentials::new();
        for &indexer in Indexer::all() {
            if let Some(key) = config.api_key(indexer) {
                let key = ApiKey::new(key).map_err(|message| ServerError::Config {
                    message: format!("indexer {indexer}: {message}"),
                })?;
                credentials = credentials.with_key(indexer, key);
            }
        }

        let cache = Arc::new(ResponseDataCache::with_settings(
            config.cache.ttl(),
            config.cache.max_entries,
        ));

        let api_bases = Indexer::all()
            .iter()
            .map(|&indexer| (indexer, config.api_base(indexer)))
            .collect();

        info!(
            request_timeout = ?executor.timeout(),
            cache_ttl_seconds = config.cache.ttl_seconds,
            cache_max_entries = config.cache.max_entries,
            "tracker pipeline initialised"
        );

        let client = TrackerClient::new(executor, Arc::new(limiters));
        let fetcher = CachedFetcher::new(client, Arc::new(credentials), cache.clone());

        Ok(Self {
            fetcher,
            cache,
            api_bases,
        })
    }

    /// Fetch `action` for `id` from the indexer named in `request`
    ///
    /// # Errors
    ///
    /// Returns the pipeline's `TrackerError` wrapped in `ServerError::Tracker`.
    pub async fn fetch(
        &self,
        request: &RequestData,
        id: u64,
        action: &str,
    ) -> ServerResult<ResponseData> {
        let api_base = self.api_base(request.indexer);
        Ok(self.fetcher.fetch(request, id, action, api_base).await?)
    }

    /// API base used for `indexer`
    pub fn api_base(&self, indexer: Indexer) -> &str {
        self.api_bases
            .get(&indexer)
            .map_or_else(|| indexer.api_base(), String::as_str)
    }

    /// Response cache backing the pipeline
    pub fn cache(&self) -> &Arc<ResponseDataCache> {
        &self.cache
    }
}

/// Shared application state with cancellation token support
#[derive(Debug, Clone)]
pub struct ServerState {
    /// Server configuration
    config: ServerConfig,
    /// Tracker request pipeline
    pipeline: Arc<TrackerPipeline>,
    /// Cancellation token for coordinated shutdown
    pub cancellation_token: CancellationToken,
}

impl ServerState {
    /// Create new server state
    pub fn new(
        config: ServerConfig,
        pipeline: Arc<TrackerPipeline>,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            config,
            pipeline,
            cancellation_token,
        }
    }

    /// Server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Tracker request pipeline
    pub fn pipeline(&self) -> &TrackerPipeline {
        &self.pipeline
    }

    /// Report service health
    pub fn health_check(&self) -> HealthCheck {
        let indexers = Indexer::all()
            .iter()
            .map(|&indexer| IndexerStatus {
                indexer,
                api_base: self.pipeline.api_base(indexer).to_string(),
                api_key_configured: self.config.api_key(indexer).is_some(),
                rate_limit: self.config.rate_limit(indexer),
            })
            .collect();

        HealthCheck {
            status: HealthStatus::Up,
            version: Box::from(env!("CARGO_PKG_VERSION")),
            environment: self.config.environment,
            timestamp: chrono::Utc::now().to_rfc3339(),
            indexers,
            cache: self.pipeline.cache().get_stats(),
        }
    }
}

/// Health status of the service
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum HealthStatus {
    /// Service is fully operational and responding normally
    Up,
}

/// Configuration summary for one indexer
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexerStatus {
    /// Indexer
    pub indexer: Indexer,
    /// API base requests are sent to
    pub api_base: String,
    /// Whether a key is configured, so requests need not carry one
    pub api_key_configured: bool,
    /// Effective rate limit
    pub rate_limit: RateLimitConfig,
}

/// Health check status
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheck {
    /// Service status
    pub status: HealthStatus,
    /// Service version
    pub version: Box<str>,
    /// Environment
    pub environment: Environment,
    /// Timestamp
    pub timestamp: String,
    /// Indexer configuration summary
    pub indexers: Vec<IndexerStatus>,
    /// Response cache statistics
    pub cache: ResponseCacheStats,
}
