//! Content-addressed memoization of raw extraction results
//!
//! Bounded, TTL'd cache keyed by `(extractor, hash of text prefix)`. A
//! cache hit short-circuits re-computation on repeat calls with identical
//! text. The cache is injected into the engine at construction so callers
//! and tests control its size and lifetime; it is the engine's only shared
//! mutable state and is internally synchronized.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use sid_core::CacheConfig;
use sid_extractor::ExtractorId;

/// Key for one cached extraction
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
struct CacheKey {
    extractor: ExtractorId,
    text_hash: u64,
}

/// Shared cache of raw extraction results
#[derive(Clone)]
pub struct ExtractionCache {
    cache: Cache<CacheKey, Arc<HashMap<String, f64>>>,
    key_prefix_chars: usize,
    stats: Arc<CacheStats>,
}

impl ExtractionCache {
    pub fn new() -> Self {
        Self::with_config(&CacheConfig::default())
    }

    pub fn with_config(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.ttl_seconds))
            .build();

        Self {
            cache,
            key_prefix_chars: config.key_prefix_chars,
            stats: Arc::new(CacheStats::default()),
        }
    }

    /// Look up a raw result for `(extractor, text)`
    pub fn get(&self, extractor: ExtractorId, text: &str) -> Option<Arc<HashMap<String, f64>>> {
        let key = self.key_for(extractor, text);
        let result = self.cache.get(&key);

        if result.is_some() {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
        }

        result
    }

    /// Store a raw result for `(extractor, text)`
    pub fn put(&self, extractor: ExtractorId, text: &str, scores: HashMap<String, f64>) {
        let key = self.key_for(extractor, text);
        self.cache.insert(key, Arc::new(scores));
        self.stats.writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Drop every cached entry
    pub fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks();
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    /// Snapshot of hit/miss/write counters
    pub fn stats(&self) -> CacheStatsReport {
        let hits = self.stats.hits.load(Ordering::Relaxed);
        let misses = self.stats.misses.load(Ordering::Relaxed);
        CacheStatsReport {
            hits,
            misses,
            writes: self.stats.writes.load(Ordering::Relaxed),
            hit_rate: if hits + misses == 0 {
                0.0
            } else {
                hits as f64 / (hits + misses) as f64
            },
        }
    }

    fn key_for(&self, extractor: ExtractorId, text: &str) -> CacheKey {
        // Only the leading prefix participates in the key; hashing a whole
        // transcript per lookup would defeat the latency budget.
        let prefix_end = text
            .char_indices()
            .nth(self.key_prefix_chars)
            .map(|(i, _)| i)
            .unwrap_or(text.len());

        let mut hasher = DefaultHasher::new();
        text[..prefix_end].hash(&mut hasher);
        text.len().hash(&mut hasher);

        CacheKey {
            extractor,
            text_hash: hasher.finish(),
        }
    }
}

impl Default for ExtractionCache {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
}

/// Serializable cache counters snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStatsReport {
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub hit_rate: f64,
}
