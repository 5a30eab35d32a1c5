// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Core types and collaborator seams for the tracker request pipeline
//!
//! This crate holds everything the pipeline and its callers share without
//! pulling in an HTTP stack.
//!
//! # Core Abstractions
//!
//! - **Envelope**: [`ResponseData`] with a lazily decoded, action-keyed payload
//! - **Errors**: [`TrackerError`] taxonomy with context wrapping and [`TrackerError::root`]
//! - **Collaborators**: [`RateLimit`], [`LimiterRegistry`], [`CredentialProvider`] and
//!   [`ResponseCache`], injected into the pipeline so tests can substitute stubs

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared_types::Indexer;

pub mod error;
pub mod types;

pub use error::*;
pub use types::*;

/// Non-blocking admission control for one indexer
pub trait RateLimit: Send + Sync {
    /// Take one token if available; never waits
    fn allow(&self) -> bool;
}

/// Lookup of the long-lived limiter for each indexer
pub trait LimiterRegistry: Send + Sync {
    /// Limiter for `indexer`, or `None` when none is configured
    fn limiter(&self, indexer: Indexer) -> Option<Arc<dyn RateLimit>>;
}

/// Resolves the API key to use for a request
pub trait CredentialProvider: Send + Sync {
    /// API key for `request`
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Credential`] when no usable key exists.
    fn api_key(&self, request: &RequestData) -> TrackerResult<String>;
}

/// Key/value store for successful envelopes
///
/// Implementations own eviction; callers treat a hit as valid.
pub trait ResponseCache: Send + Sync {
    /// Cached envelope for `key`
    fn get(&self, key: &CacheKey) -> Option<ResponseData>;

    /// Store `data` under `key`
    fn put(&self, key: CacheKey, data: ResponseData);
}

/// Token bucket settings for one indexer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Bucket capacity, and the number of requests allowed per period
    pub burst: u32,
    /// Time in seconds for the bucket to refill from empty
    pub period_seconds: u64,
}

impl RateLimitConfig {
    /// Published API limit for `indexer`
    pub const fn for_indexer(indexer: Indexer) -> Self {
        match indexer {
            Indexer::Redacted => Self {
                burst: 10,
                period_seconds: 10,
            },
            Indexer::Orpheus => Self {
                burst: 5,
                period_seconds: 10,
            },
        }
    }
}
