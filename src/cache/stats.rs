//! Cache Statistics Module
//!
//! Tracks how requests were answered by the worker.

use serde::Serialize;

// == Cache Stats ==
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Requests answered from a stored entry
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
    /// Runtime entries evicted to stay within bounds
    pub evictions: u64,
    /// Network-first requests answered from cache after a network failure
    pub network_fallbacks: u64,
    /// Requests answered with the static offline page
    pub offline_pages: u64,
    /// Entries across all generations
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_network_fallback(&mut self) {
        self.network_fallbacks += 1;
    }

    pub fn record_offline_page(&mut self) {
        self.offline_pages += 1;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
