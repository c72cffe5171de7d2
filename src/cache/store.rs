//! Cache Storage Module
//!
//! Named cache generations keyed by absolute GET URL. Shell entries are pinned;
//! runtime entries are bounded per generation with LRU eviction.

use std::collections::{BTreeMap, HashMap};

use crate::cache::{CacheEntry, CacheStats, CachedResponse, LruTracker, MAX_URL_LENGTH};
use crate::error::{AppError, Result};

// == Cache Generation ==
/// One versioned snapshot of stored responses.
#[derive(Debug, Default)]
pub struct CacheGeneration {
    entries: HashMap<String, CacheEntry>,
    runtime: LruTracker,
}

impl CacheGeneration {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Cache Storage ==
/// Host-mediated cache store owned exclusively by the worker.
#[derive(Debug)]
pub struct CacheStorage {
    generations: BTreeMap<String, CacheGeneration>,
    stats: CacheStats,
    max_runtime_entries: usize,
}

impl CacheStorage {
    // == Constructor ==
    /// Creates an empty storage.
    ///
    /// # Arguments
    /// * `max_runtime_entries` - Upper bound on non-pinned entries per generation
    pub fn new(max_runtime_entries: usize) -> Self {
        Self {
            generations: BTreeMap::new(),
            stats: CacheStats::new(),
            max_runtime_entries: max_runtime_entries.max(1),
        }
    }

    // == Put ==
    /// Stores a runtime copy of a response.
    ///
    /// Rejects responses that are not cacheable (non-200, non-basic, oversized).
    /// When the generation is at its runtime bound the least recently served
    /// runtime entry is evicted. Pinned entries are replaced but stay pinned.
    pub fn put(&mut self, generation: &str, url: &str, response: CachedResponse) -> Result<()> {
        validate(url, &response)?;

        let max = self.max_runtime_entries;
        let gen = self.generations.entry(generation.to_string()).or_default();

        if let Some(existing) = gen.entries.get_mut(url) {
            let pinned = existing.pinned;
            *existing = CacheEntry::new(response, pinned);
            if !pinned {
                gen.runtime.touch(url);
            }
            return Ok(());
        }

        let mut evicted = 0;
        while gen.runtime.len() >= max {
            match gen.runtime.evict_oldest() {
                Some(old) => {
                    gen.entries.remove(&old);
                    evicted += 1;
                }
                None => break,
            }
        }

        gen.entries.insert(url.to_string(), CacheEntry::new(response, false));
        gen.runtime.touch(url);

        for _ in 0..evicted {
            self.stats.record_eviction();
        }
        self.refresh_total();
        Ok(())
    }

    // == Put All ==
    /// Commits a batch of pinned entries atomically.
    ///
    /// Every entry is validated before anything is written; one bad entry
    /// leaves the storage untouched.
    pub fn put_all(&mut self, generation: &str, batch: Vec<(String, CachedResponse)>) -> Result<()> {
        for (url, response) in &batch {
            validate(url, response)?;
        }

        let gen = self.generations.entry(generation.to_string()).or_default();
        for (url, response) in batch {
            gen.runtime.remove(&url);
            gen.entries.insert(url, CacheEntry::new(response, true));
        }

        self.refresh_total();
        Ok(())
    }

    // == Match ==
    /// Looks up a URL, searching `preferred` first and then every other generation.
    pub fn match_url(&mut self, url: &str, preferred: &str) -> Option<CachedResponse> {
        let found = std::iter::once(preferred.to_string())
            .chain(
                self.generations
                    .keys()
                    .filter(|name| name.as_str() != preferred)
                    .cloned()
                    .collect::<Vec<_>>(),
            )
            .find_map(|name| {
                let gen = self.generations.get_mut(&name)?;
                let entry = gen.entries.get(url)?;
                let response = entry.response.clone();
                let pinned = entry.pinned;
                if !pinned {
                    gen.runtime.touch(url);
                }
                Some(response)
            });

        match found {
            Some(response) => {
                self.stats.record_hit();
                Some(response)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// True if any generation holds `url`. Does not touch stats.
    pub fn contains(&self, url: &str) -> bool {
        self.generations.values().any(|g| g.entries.contains_key(url))
    }

    // == Delete Except ==
    /// Deletes every generation whose name differs from `keep`.
    ///
    /// Returns the deleted generation names.
    pub fn delete_except(&mut self, keep: &str) -> Vec<String> {
        let stale: Vec<String> = self
            .generations
            .keys()
            .filter(|name| name.as_str() != keep)
            .cloned()
            .collect();

        for name in &stale {
            self.generations.remove(name);
        }

        self.refresh_total();
        stale
    }

    pub fn generation(&self, name: &str) -> Option<&CacheGeneration> {
        self.generations.get(name)
    }

    pub fn generation_names(&self) -> Vec<String> {
        self.generations.keys().cloned().collect()
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.len());
        stats
    }

    pub fn record_network_fallback(&mut self) {
        self.stats.record_network_fallback();
    }

    pub fn record_offline_page(&mut self) {
        self.stats.record_offline_page();
    }

    /// Entries across all generations.
    pub fn len(&self) -> usize {
        self.generations.values().map(CacheGeneration::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn refresh_total(&mut self) {
        let total = self.len();
        self.stats.set_total_entries(total);
    }
}

fn validate(url: &str, response: &CachedResponse) -> Result<()> {
    if url.is_empty() || url.len() > MAX_URL_LENGTH {
        return Err(AppError::InvalidRequest(format!(
            "Cache key must be between 1 and {} bytes",
            MAX_URL_LENGTH
        )));
    }
    if !response.is_cacheable() {
        return Err(AppError::InvalidRequest(format!(
            "Response for {} is not cacheable (status {}, {:?})",
            url, response.status, response.kind
        )));
    }
    Ok(())
}
