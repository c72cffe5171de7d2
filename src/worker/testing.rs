//! Scripted network for worker tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::cache::CachedResponse;
use crate::error::{AppError, Result};
use crate::worker::event::FetchRequest;
use crate::worker::network::Fetcher;

/// Answers from a per-URL script; unknown URLs behave as unreachable.
#[derive(Default)]
pub struct ScriptedFetcher {
    responses: Mutex<HashMap<String, Option<CachedResponse>>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, response: CachedResponse) {
        self.responses.lock().unwrap().insert(url.to_string(), Some(response));
    }

    pub fn fail(&self, url: &str) {
        self.responses.lock().unwrap().insert(url.to_string(), None);
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<CachedResponse> {
        *self.calls.lock().unwrap().entry(request.url.clone()).or_insert(0) += 1;
        match self.responses.lock().unwrap().get(&request.url) {
            Some(Some(response)) => Ok(response.clone()),
            _ => Err(AppError::Transport(format!("unreachable: {}", request.url))),
        }
    }
}
