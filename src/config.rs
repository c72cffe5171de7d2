//! Configuration Module
//!
//! Handles loading runtime configuration from environment variables. The cache
//! generation tag is fixed at build time.

use std::env;
use std::time::Duration;

/// Cache generation tag baked in at build time.
///
/// Changing it invalidates every previously stored generation on the next activation.
pub const CACHE_VERSION: &str = match option_env!("CALPUSH_CACHE_VERSION") {
    Some(version) => version,
    None => "calendar-cache-v1",
};

/// Application shell assets fetched during install.
pub const DEFAULT_PRECACHE_URLS: &[&str] = &[
    "/",
    "/index.html",
    "/manifest.json",
    "/icons/icon-192x192.png",
    "/icons/icon-512x512.png",
];

/// Runtime configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Local proxy port
    pub server_port: u16,
    /// Origin the proxy forwards to; also the app origin for same-origin checks
    pub upstream_origin: String,
    /// Base URL of the remote preferences API
    pub api_base_url: String,
    /// Path prefix routed network-first
    pub api_prefix: String,
    /// Shell manifest, relative to the upstream origin
    pub precache_urls: Vec<String>,
    /// Upper bound on runtime (non-shell) entries per generation
    pub max_runtime_entries: usize,
    /// Subscription attempts for regular browsers
    pub subscribe_attempts: u32,
    /// Delay between subscription attempts in milliseconds
    pub subscribe_delay_ms: u64,
    /// Subscription attempts for browsers with flaky push services
    pub flaky_subscribe_attempts: u32,
    /// Delay between attempts for flaky browsers in milliseconds
    pub flaky_subscribe_delay_ms: u64,
    /// Interval in seconds between pending subscription sync retries
    pub sync_interval: u64,
    /// Debounce delay for email edits in milliseconds
    pub email_debounce_ms: u64,
    /// Default notification icon
    pub notification_icon: String,
    /// Default notification badge
    pub notification_badge: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - Proxy port (default: 3000)
    /// - `UPSTREAM_ORIGIN` - Calendar app origin (default: http://localhost:8080)
    /// - `API_BASE_URL` - Preferences API base (default: upstream origin)
    /// - `API_PREFIX` - Network-first path prefix (default: /api/)
    /// - `PRECACHE_URLS` - Comma separated shell manifest
    /// - `MAX_RUNTIME_ENTRIES` - Runtime entries per generation (default: 500)
    /// - `SUBSCRIBE_ATTEMPTS` / `SUBSCRIBE_DELAY_MS` - Retry budget (default: 3 / 1000)
    /// - `FLAKY_SUBSCRIBE_ATTEMPTS` / `FLAKY_SUBSCRIBE_DELAY_MS` - Retry budget for
    ///   Brave and Edge (default: 5 / 2000)
    /// - `SYNC_INTERVAL` - Pending sync retry interval in seconds (default: 60)
    /// - `EMAIL_DEBOUNCE_MS` - Email edit debounce (default: 1000)
    /// - `NOTIFICATION_ICON` / `NOTIFICATION_BADGE` - Default notification images
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let upstream_origin = env_string("UPSTREAM_ORIGIN").unwrap_or(defaults.upstream_origin);

        Self {
            server_port: env_parse("SERVER_PORT").unwrap_or(defaults.server_port),
            api_base_url: env_string("API_BASE_URL").unwrap_or_else(|| upstream_origin.clone()),
            upstream_origin,
            api_prefix: env_string("API_PREFIX").unwrap_or(defaults.api_prefix),
            precache_urls: env_string("PRECACHE_URLS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or(defaults.precache_urls),
            max_runtime_entries: env_parse("MAX_RUNTIME_ENTRIES")
                .unwrap_or(defaults.max_runtime_entries),
            subscribe_attempts: env_parse("SUBSCRIBE_ATTEMPTS")
                .unwrap_or(defaults.subscribe_attempts),
            subscribe_delay_ms: env_parse("SUBSCRIBE_DELAY_MS")
                .unwrap_or(defaults.subscribe_delay_ms),
            flaky_subscribe_attempts: env_parse("FLAKY_SUBSCRIBE_ATTEMPTS")
                .unwrap_or(defaults.flaky_subscribe_attempts),
            flaky_subscribe_delay_ms: env_parse("FLAKY_SUBSCRIBE_DELAY_MS")
                .unwrap_or(defaults.flaky_subscribe_delay_ms),
            sync_interval: env_parse("SYNC_INTERVAL").unwrap_or(defaults.sync_interval),
            email_debounce_ms: env_parse("EMAIL_DEBOUNCE_MS")
                .unwrap_or(defaults.email_debounce_ms),
            notification_icon: env_string("NOTIFICATION_ICON")
                .unwrap_or(defaults.notification_icon),
            notification_badge: env_string("NOTIFICATION_BADGE")
                .unwrap_or(defaults.notification_badge),
        }
    }

    /// Debounce delay for email edits.
    pub fn email_debounce(&self) -> Duration {
        Duration::from_millis(self.email_debounce_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            upstream_origin: "http://localhost:8080".to_string(),
            api_base_url: "http://localhost:8080".to_string(),
            api_prefix: "/api/".to_string(),
            precache_urls: DEFAULT_PRECACHE_URLS.iter().map(|s| s.to_string()).collect(),
            max_runtime_entries: 500,
            subscribe_attempts: 3,
            subscribe_delay_ms: 1000,
            flaky_subscribe_attempts: 5,
            flaky_subscribe_delay_ms: 2000,
            sync_interval: 60,
            email_debounce_ms: 1000,
            notification_icon: "/icons/icon-192x192.png".to_string(),
            notification_badge: "/icons/badge-72x72.png".to_string(),
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
