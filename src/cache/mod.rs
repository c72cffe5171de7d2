//! Cache Module
//!
//! Versioned response storage owned by the offline worker.

mod entry;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use entry::{CacheEntry, CachedResponse, ResponseKind};
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::{CacheGeneration, CacheStorage};

// == Public Constants ==
/// Maximum cacheable URL length in bytes
pub const MAX_URL_LENGTH: usize = 2048;

/// Maximum cacheable body size in bytes
pub const MAX_BODY_SIZE: usize = 10 * 1024 * 1024; // 10 MiB
