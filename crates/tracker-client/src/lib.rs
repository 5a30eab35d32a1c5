// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Rate-limited, cached request pipeline for tracker `ajax.php` APIs
//!
//! # Architecture
//!
//! - **Request Executor**: [`executor::RequestExecutor`] performs one rate-gated,
//!   time-bounded GET and validates the response envelope
//! - **Request Orchestrator**: [`client::TrackerClient`] builds the endpoint and
//!   pairs the call with the indexer's limiter
//! - **Cached Fetch**: [`fetcher::CachedFetcher`] serves from cache and stores
//!   successful responses only
//!
//! Default collaborators live alongside the pipeline: [`limiter::IndexerLimiters`],
//! [`cache::ResponseDataCache`] and [`credentials::ConfiguredCredentials`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use shared_types::Indexer;
//! use tracker_api::RequestData;
//! use tracker_client::{
//!     ApiKey, CachedFetcher, ConfiguredCredentials, IndexerLimiters, RequestExecutor,
//!     ResponseDataCache, TrackerClient,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = TrackerClient::new(
//!     RequestExecutor::new()?,
//!     Arc::new(IndexerLimiters::with_defaults()),
//! );
//! let credentials = ConfiguredCredentials::new().with_key(Indexer::Redacted, ApiKey::new("key")?);
//! let fetcher = CachedFetcher::new(
//!     client,
//!     Arc::new(credentials),
//!     Arc::new(ResponseDataCache::new()),
//! );
//!
//! let data = fetcher
//!     .fetch_indexer(&RequestData::new(Indexer::Redacted), 42, "torrent")
//!     .await?;
//! println!("{}", data.status);
//! # Ok(())
//! # }
//! ```

pub mod api_key;
pub mod cache;
pub mod client;
pub mod credentials;
pub mod executor;
pub mod fetcher;
pub mod limiter;

pub use api_key::ApiKey;
pub use cache::*;
pub use client::*;
pub use credentials::*;
pub use executor::*;
pub use fetcher::*;
pub use limiter::*;
