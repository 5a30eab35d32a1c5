// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory store for successful tracker responses
//!
//! Entries are scoped by indexer through [`CacheKey`]. Expiry and capacity
//! eviction live here; the fetch path treats any hit as valid.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use shared_types::Indexer;
use tracing::{debug, info, trace};
use tracker_api::{CacheKey, ResponseCache, ResponseData};

const DEFAULT_TTL_SECONDS: u64 = 300;
const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Cached envelope with access tracking
#[derive(Debug, Clone)]
pub struct CachedResponse {
    /// The cached envelope
    pub data: ResponseData,
    /// When this entry was stored
    pub cached_at: Instant,
    /// When this entry was last stored or served
    pub last_accessed: Instant,
    /// How many times this entry has been served
    pub access_count: u64,
}

impl CachedResponse {
    /// Create a new entry stored now
    pub fn new(data: ResponseData) -> Self {
        let now = Instant::now();
        Self {
            data,
            cached_at: now,
            last_accessed: now,
            access_count: 0,
        }
    }

    /// Whether the entry is younger than `ttl`
    pub fn is_valid(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() < ttl
    }

    fn accessed(&mut self) {
        self.access_count += 1;
        self.last_accessed = Instant::now();
    }
}

/// Concurrent response cache with TTL and capacity bounds
#[derive(Debug)]
pub struct ResponseDataCache {
    entries: DashMap<CacheKey, CachedResponse>,
    ttl: Duration,
    max_entries: usize,
    stats: DashMap<String, u64>,
}

impl Default for ResponseDataCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseDataCache {
    /// Create a cache with a five minute TTL and 10k entries
    pub fn new() -> Self {
        Self::with_settings(
            Duration::from_secs(DEFAULT_TTL_SECONDS),
            DEFAULT_MAX_ENTRIES,
        )
    }

    /// Create a cache with custom settings
    pub fn with_settings(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            max_entries,
            stats: DashMap::new(),
        }
    }

    /// Cached envelope for `key`, dropping it if expired
    pub fn get_response(&self, key: &CacheKey) -> Option<ResponseData> {
        if let Some(mut cached) = self.entries.get_mut(key) {
            if cached.is_valid(self.ttl) {
                cached.accessed();
                self.increment_stat("cache_hits");
                self.increment_stat(&format!("cache_hits_{}", key.indexer));
                trace!(key = %key, "cache hit");
                return Some(cached.data.clone());
            }

            drop(cached);
            self.entries.remove(key);
            self.increment_stat("cache_expired");
            debug!(key = %key, "expired cache entry removed");
        }

        self.increment_stat("cache_misses");
        None
    }

    /// Store `data` under `key`, evicting if at capacity
    pub fn store_response(&self, key: CacheKey, data: ResponseData) {
        if self.max_entries == 0 {
            return;
        }

        let current_size = self.entries.len();
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let capacity_threshold = (self.max_entries as f64 * 0.9) as usize;

        if current_size >= self.max_entries && !self.entries.contains_key(&key) {
            self.evict_oldest_entry();
        } else if current_size >= capacity_threshold {
            self.cleanup_expired();
        }

        trace!(
            key = %key,
            size = self.entries.len() + 1,
            max_entries = self.max_entries,
            "stored response in cache"
        );
        self.entries.insert(key, CachedResponse::new(data));
        self.increment_stat("cache_stores");
    }

    fn evict_oldest_entry(&self) {
        let lru_key = self
            .entries
            .iter()
            .min_by(|a, b| {
                a.value()
                    .last_accessed
                    .cmp(&b.value().last_accessed)
                    .then(a.value().access_count.cmp(&b.value().access_count))
            })
            .map(|item| item.key().clone());

        if let Some(key) = lru_key
            && let Some((key, entry)) = self.entries.remove(&key)
        {
            self.increment_stat("cache_evictions");
            info!(
                key = %key,
                access_count = entry.access_count,
                age_ms = entry.cached_at.elapsed().as_millis(),
                remaining_entries = self.entries.len(),
                "evicted lru cache entry due to capacity limit"
            );
        }
    }

    /// Remove expired entries, returning how many were dropped
    pub fn cleanup_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_valid(self.ttl));
        let removed = before.saturating_sub(self.entries.len());

        if removed > 0 {
            self.stats
                .entry("cache_expired".to_string())
                .and_modify(|v| *v += removed as u64)
                .or_insert(removed as u64);
            debug!(removed, "cleaned up expired cache entries");
        }

        removed
    }

    /// Drop every entry and reset statistics
    pub fn clear(&self) {
        self.entries.clear();
        self.stats.clear();
        debug!("cleared response cache and statistics");
    }

    /// Number of stored entries, including any not yet expired out
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of cache statistics
    pub fn get_stats(&self) -> ResponseCacheStats {
        let cache_hits = self.get_stat("cache_hits");
        let cache_misses = self.get_stat("cache_misses");
        let total_requests = cache_hits + cache_misses;
        #[allow(clippy::cast_precision_loss)]
        let hit_rate = if total_requests > 0 {
            cache_hits as f64 / total_requests as f64
        } else {
            0.0
        };

        let entry_count = self.entries.len();
        #[allow(clippy::cast_precision_loss)]
        let utilization_rate = if self.max_entries > 0 {
            entry_count as f64 / self.max_entries as f64
        } else {
            0.0
        };

        ResponseCacheStats {
            entry_count,
            cache_hits,
            cache_misses,
            cache_stores: self.get_stat("cache_stores"),
            cache_evictions: self.get_stat("cache_evictions"),
            cache_expired: self.get_stat("cache_expired"),
            hit_rate,
            utilization_rate,
            max_capacity: self.max_entries,
            ttl_seconds: self.ttl.as_secs(),
            hits_by_indexer: Indexer::all()
                .iter()
                .map(|&indexer| (indexer, self.get_stat(&format!("cache_hits_{indexer}"))))
                .collect(),
        }
    }

    fn increment_stat(&self, key: &str) {
        self.stats
            .entry(key.to_string())
            .and_modify(|v| *v += 1)
            .or_insert(1);
    }

    fn get_stat(&self, key: &str) -> u64 {
        self.stats.get(key).map_or(0, |v| *v)
    }
}

impl ResponseCache for ResponseDataCache {
    fn get(&self, key: &CacheKey) -> Option<ResponseData> {
        self.get_response(key)
    }

    fn put(&self, key: CacheKey, data: ResponseData) {
        self.store_response(key, data);
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseCacheStats {
    /// Number of cached entries
    pub entry_count: usize,
    /// Cache hit count
    pub cache_hits: u64,
    /// Cache miss count
    pub cache_misses: u64,
    /// Number of stores
    pub cache_stores: u64,
    /// Number of capacity evictions
    pub cache_evictions: u64,
    /// Number of expired entries removed
    pub cache_expired: u64,
    /// Hit rate (0.0 to 1.0)
    pub hit_rate: f64,
    /// Utilization (0.0 to 1.0)
    pub utilization_rate: f64,
    /// Maximum capacity
    pub max_capacity: usize,
    /// TTL in seconds
    pub ttl_seconds: u64,
    /// Hits per indexer
    pub hits_by_indexer: Vec<(Indexer, u64)>,
}
