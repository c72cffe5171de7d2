//! Network seam used by the driver.

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::cache::{CachedResponse, ResponseKind};
use crate::error::{AppError, Result};
use crate::worker::event::FetchRequest;

/// Headers that describe a single hop and must not be forwarded.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "content-length",
    "host",
    "keep-alive",
    "proxy-connection",
    "transfer-encoding",
    "upgrade",
];

pub fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|h| h.eq_ignore_ascii_case(name))
}

/// Performs real network requests. `Err` means the network was unreachable;
/// any HTTP status, error statuses included, is an `Ok` response.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<CachedResponse>;
}

/// reqwest-backed fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    app_origin: Url,
}

impl HttpFetcher {
    pub fn new(app_origin: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            app_origin,
        }
    }

    /// Same-origin responses are `Basic`; anything else is `Cors`. Callers pass
    /// the final URL after redirects.
    fn kind_for(&self, url: &str) -> ResponseKind {
        match Url::parse(url) {
            Ok(u) if u.origin() == self.app_origin.origin() => ResponseKind::Basic,
            _ => ResponseKind::Cors,
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<CachedResponse> {
        let mut builder = self.client.request(request.method.clone(), &request.url);
        for (name, value) in request.headers.iter().filter(|(n, _)| !is_hop_by_hop(n)) {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("{} {}: {}", request.method, request.url, e)))?;

        let status = response.status().as_u16();
        let kind = self.kind_for(response.url().as_str());
        let headers = response
            .headers()
            .iter()
            .filter(|(name, _)| !is_hop_by_hop(name.as_str()))
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::Transport(format!("reading body of {}: {}", request.url, e)))?
            .to_vec();

        debug!(url = %request.url, status, "Network response");

        Ok(CachedResponse {
            status,
            headers,
            body,
            kind,
        })
    }
}
