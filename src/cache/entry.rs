//! Cache Entry Module
//!
//! Defines stored responses and the entries that wrap them inside a generation.

use serde::{Deserialize, Serialize};

use crate::cache::MAX_BODY_SIZE;

// == Response Kind ==
/// Response type as seen by the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    /// Same-origin, fully readable
    Basic,
    /// Cross-origin with CORS headers
    Cors,
    /// Cross-origin, unreadable
    Opaque,
    /// Synthesized network error
    Error,
}

// == Cached Response ==
/// A response as stored in (or served from) the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub kind: ResponseKind,
}

const OFFLINE_PAGE: &str = "<!DOCTYPE html>\
<html><head><meta charset=\"utf-8\"><title>Offline</title></head>\
<body><h1>You are offline</h1>\
<p>The calendar is not reachable right now. Reconnect and try again.</p>\
</body></html>";

impl CachedResponse {
    /// Creates a same-origin response.
    pub fn basic(status: u16, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: vec![("content-type".to_string(), content_type.to_string())],
            body: body.into(),
            kind: ResponseKind::Basic,
        }
    }

    // == Cacheable ==
    /// Only status 200 same-origin responses within the size limit may be stored.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.kind == ResponseKind::Basic && self.body.len() <= MAX_BODY_SIZE
    }

    /// Static page returned when neither network nor cache can answer.
    pub fn offline_fallback() -> Self {
        Self::basic(503, "text/html; charset=utf-8", OFFLINE_PAGE)
    }

    /// Response returned for a pass-through request whose network fetch failed.
    pub fn network_error(message: &str) -> Self {
        let body = serde_json::json!({ "success": false, "error": message }).to_string();
        Self {
            status: 502,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: body.into_bytes(),
            kind: ResponseKind::Error,
        }
    }

    /// Returns the first header value matching `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

// == Cache Entry ==
/// A stored response plus metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub response: CachedResponse,
    /// Shell entries written during install are never evicted
    pub pinned: bool,
}

impl CacheEntry {
    pub fn new(response: CachedResponse, pinned: bool) -> Self {
        Self {
            response,
            pinned,
        }
    }
}
