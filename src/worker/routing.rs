//! Request routing policy.
//!
//! API calls go network-first so live data wins whenever the network answers;
//! everything else is served cache-first.

use axum::http::Method;
use url::Url;

use crate::worker::event::FetchRequest;
use crate::worker::lifecycle::LifecycleState;

/// How a single request will be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchPlan {
    /// Not intercepted: straight to the network, never stored
    Passthrough(FetchRequest),
    /// Network, then cache, then the offline page
    NetworkFirst(FetchRequest),
    /// Cache, then network (storing cacheable responses), then the offline page
    CacheFirst(FetchRequest),
}

impl FetchPlan {
    pub fn request(&self) -> &FetchRequest {
        match self {
            FetchPlan::Passthrough(r) | FetchPlan::NetworkFirst(r) | FetchPlan::CacheFirst(r) => r,
        }
    }

    pub fn strategy(&self) -> &'static str {
        match self {
            FetchPlan::Passthrough(_) => "passthrough",
            FetchPlan::NetworkFirst(_) => "network-first",
            FetchPlan::CacheFirst(_) => "cache-first",
        }
    }
}

/// Picks the plan for `request`.
pub fn route(state: LifecycleState, api_prefix: &str, request: FetchRequest) -> FetchPlan {
    if !state.can_intercept_fetch() || request.method != Method::GET {
        return FetchPlan::Passthrough(request);
    }

    let parsed = match Url::parse(&request.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url,
        _ => return FetchPlan::Passthrough(request),
    };

    if is_api_path(parsed.path(), api_prefix) {
        FetchPlan::NetworkFirst(request)
    } else {
        FetchPlan::CacheFirst(request)
    }
}

/// Whole-segment prefix match: `/api/` covers `/api` and `/api/events`, not `/apiary`.
fn is_api_path(path: &str, api_prefix: &str) -> bool {
    let prefix = api_prefix.trim_end_matches('/');
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}
