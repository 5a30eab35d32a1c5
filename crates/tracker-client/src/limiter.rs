// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Per-indexer token bucket rate limiting
//!
//! [`TokenBucket`] is a non-blocking limiter: [`RateLimit::allow`] either takes a
//! token immediately or reports that none is available. [`IndexerLimiters`]
//! holds one long-lived bucket per indexer and is shared by every request.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use dashmap::DashMap;
use shared_types::Indexer;
use tracing::{debug, info};
use tracker_api::{LimiterRegistry, RateLimit, RateLimitConfig};

/// Token bucket with continuous refill
#[derive(Debug)]
pub struct TokenBucket {
    capacity: f64,
    refill_per_second: f64,
    state: Mutex<BucketState>,
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// Create a full bucket holding `burst` tokens that refills completely every `period`
    pub fn new(burst: u32, period: Duration) -> Self {
        let capacity = f64::from(burst);
        let refill_per_second = if period.is_zero() {
            f64::INFINITY
        } else {
            capacity / period.as_secs_f64()
        };

        Self {
            capacity,
            refill_per_second,
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Create a bucket from indexer rate limit settings
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.burst, Duration::from_secs(config.period_seconds))
    }

    /// Whole tokens currently available
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn available(&self) -> u32 {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.refill(&mut state, Instant::now());
        state.tokens.floor() as u32
    }

    fn refill(&self, state: &mut BucketState, now: Instant) {
        let elapsed = now.saturating_duration_since(state.last_refill);
        if elapsed.is_zero() {
            return;
        }

        let replenished = elapsed.as_secs_f64() * self.refill_per_second;
        state.tokens = (state.tokens + replenished).min(self.capacity);
        state.last_refill = now;
    }
}

impl RateLimit for TokenBucket {
    fn allow(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.refill(&mut state, Instant::now());

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Registry of one token bucket per indexer
#[derive(Debug, Default)]
pub struct IndexerLimiters {
    limiters: DashMap<Indexer, Arc<TokenBucket>>,
}

impl IndexerLimiters {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the published limit for every known indexer
    pub fn with_defaults() -> Self {
        Self::from_configs(
            Indexer::all()
                .iter()
                .map(|&indexer| (indexer, RateLimitConfig::for_indexer(indexer))),
        )
    }

    /// Create a registry from explicit per-indexer settings
    pub fn from_configs(configs: impl IntoIterator<Item = (Indexer, RateLimitConfig)>) -> Self {
        let registry = Self::new();
        for (indexer, config) in configs {
            registry.insert(indexer, &config);
        }
        registry
    }

    /// Install or replace the limiter for `indexer`
    pub fn insert(&self, indexer: Indexer, config: &RateLimitConfig) {
        info!(
            indexer = %indexer,
            burst = config.burst,
            period_seconds = config.period_seconds,
            "configured indexer rate limiter"
        );
        self.limiters
            .insert(indexer, Arc::new(TokenBucket::from_config(config)));
    }

    /// Number of configured limiters
    pub fn len(&self) -> usize {
        self.limiters.len()
    }

    /// Whether no limiter is configured
    pub fn is_empty(&self) -> bool {
        self.limiters.is_empty()
    }
}

impl LimiterRegistry for IndexerLimiters {
    fn limiter(&self, indexer: Indexer) -> Option<Arc<dyn RateLimit>> {
        let limiter = self.limiters.get(&indexer).map(|entry| {
            let bucket: Arc<dyn RateLimit> = entry.value().clone();
            bucket
        });
        if limiter.is_none() {
            debug!(indexer = %indexer, "no rate limiter configured");
        }
        limiter
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn allows_up_to_burst_then_denies() {
        let bucket = TokenBucket::new(3, Duration::from_secs(3600));

        for _ in 0..3 {
            assert!(bucket.allow());
        }
        assert!(!bucket.allow());
        assert!(!bucket.allow());
    }

    #[test]
    fn refills_over_time() {
        let bucket = TokenBucket::new(2, Duration::from_millis(400));

        assert!(bucket.allow());
        assert!(bucket.allow());
        assert!(!bucket.allow());

        thread::sleep(Duration::from_millis(300));

        assert!(bucket.allow());
    }

    #[test]
    fn refill_is_capped_at_capacity() {
        let bucket = TokenBucket::new(2, Duration::from_millis(1));
        thread::sleep(Duration::from_millis(20));
        assert_eq!(bucket.available(), 2);
    }

    #[test]
    fn zero_capacity_never_admits() {
        let bucket = TokenBucket::new(0, Duration::from_secs(1));
        assert!(!bucket.allow());
    }

    #[test]
    fn registry_defaults_cover_all_indexers() {
        let registry = IndexerLimiters::with_defaults();
        assert_eq!(registry.len(), Indexer::all().len());

        for &indexer in Indexer::all() {
            assert!(registry.limiter(indexer).is_some());
        }
    }

    #[test]
    fn registry_missing_indexer() {
        let registry = IndexerLimiters::from_configs([(
            Indexer::Redacted,
            RateLimitConfig {
                burst: 1,
                period_seconds: 10,
            },
        )]);

        assert!(registry.limiter(Indexer::Orpheus).is_none());
    }

    #[test]
    fn limiter_is_shared_across_lookups() {
        let registry = IndexerLimiters::from_configs([(
            Indexer::Orpheus,
            RateLimitConfig {
                burst: 1,
                period_seconds: 3600,
            },
        )]);

        let first = registry.limiter(Indexer::Orpheus).unwrap();
        let second = registry.limiter(Indexer::Orpheus).unwrap();

        assert!(first.allow());
        assert!(!second.allow());
    }

    #[test]
    fn indexers_have_independent_buckets() {
        let registry = IndexerLimiters::from_configs(Indexer::all().iter().map(|&indexer| {
            (
                indexer,
                RateLimitConfig {
                    burst: 1,
                    period_seconds: 3600,
                },
            )
        }));

        assert!(registry.limiter(Indexer::Redacted).unwrap().allow());
        assert!(registry.limiter(Indexer::Orpheus).unwrap().allow());
        assert!(!registry.limiter(Indexer::Redacted).unwrap().allow());
    }
}
