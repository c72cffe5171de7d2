//! Response DTOs
//!
//! Bodies received from the remote API and returned by the worker proxy.

use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;
use crate::worker::LifecycleState;

/// Body of `GET /api/notifications/vapid-public-key`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VapidKeyEnvelope {
    pub success: bool,
    #[serde(rename = "publicKey", alias = "public_key")]
    pub public_key: Option<String>,
}

/// One record of `GET /api/users/me/event-preferences`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoredEventPreference {
    #[serde(alias = "eventType")]
    pub event_type: String,
    #[serde(alias = "isEnabled")]
    pub is_enabled: bool,
}

/// Response body for `GET /sw/status`
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub state: LifecycleState,
    pub cache_version: String,
    pub generations: Vec<String>,
    pub stats: CacheStats,
    pub hit_rate: f64,
}

impl StatusResponse {
    pub fn new(
        state: LifecycleState,
        cache_version: impl Into<String>,
        generations: Vec<String>,
        stats: CacheStats,
    ) -> Self {
        let hit_rate = stats.hit_rate();
        Self {
            state,
            cache_version: cache_version.into(),
            generations,
            stats,
            hit_rate,
        }
    }
}

/// Response body for the health endpoint (GET /sw/health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
