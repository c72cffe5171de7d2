//! Runtime Entry Tracker
//!
//! Least-recently-used ordering for runtime cache entries of one generation.
//! Pinned shell entries are never tracked, so they can never be evicted.

use std::collections::VecDeque;

// == Runtime Tracker ==
/// Front = most recently served URL, back = eviction candidate.
#[derive(Debug, Default, Clone)]
pub struct LruTracker {
    order: VecDeque<String>,
}

impl LruTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a URL as just served or stored.
    pub fn touch(&mut self, url: &str) {
        self.remove(url);
        self.order.push_front(url.to_string());
    }

    // == Remove ==
    pub fn remove(&mut self, url: &str) {
        self.order.retain(|k| k != url);
    }

    // == Evict Oldest ==
    /// Pops the least recently served URL.
    pub fn evict_oldest(&mut self) -> Option<String> {
        self.order.pop_back()
    }

    /// Number of runtime URLs tracked.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.order.iter().any(|k| k == url)
    }
}
