//! Effect driver.
//!
//! Owns the worker's lifecycle state, its cache storage and the host seams, and
//! executes the effects produced by `handle_event`.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::cache::{CacheStorage, CachedResponse};
use crate::error::{AppError, Result};
use crate::worker::dispatch::{handle_event, WorkerContext};
use crate::worker::event::{Effect, FetchRequest, WorkerEvent};
use crate::worker::host::WorkerHost;
use crate::worker::lifecycle::LifecycleState;
use crate::worker::messages::{Reply, WorkerMessage};
use crate::worker::network::Fetcher;
use crate::worker::notification::{normalize, NotificationOptions};
use crate::worker::routing::FetchPlan;

/// What a dispatched event produced for its caller.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DispatchOutcome {
    /// Response for a fetch event
    pub response: Option<CachedResponse>,
    /// Reply for a message sent with a reply channel
    pub reply: Option<Reply>,
}

/// Runs worker events against real storage, network and host.
pub struct WorkerDriver {
    ctx: WorkerContext,
    state: RwLock<LifecycleState>,
    storage: Arc<RwLock<CacheStorage>>,
    fetcher: Arc<dyn Fetcher>,
    host: Arc<dyn WorkerHost>,
}

impl WorkerDriver {
    pub fn new(
        ctx: WorkerContext,
        storage: Arc<RwLock<CacheStorage>>,
        fetcher: Arc<dyn Fetcher>,
        host: Arc<dyn WorkerHost>,
    ) -> Self {
        Self {
            ctx,
            state: RwLock::new(LifecycleState::Installing),
            storage,
            fetcher,
            host,
        }
    }

    pub fn context(&self) -> &WorkerContext {
        &self.ctx
    }

    pub fn storage(&self) -> Arc<RwLock<CacheStorage>> {
        self.storage.clone()
    }

    pub async fn state(&self) -> LifecycleState {
        *self.state.read().await
    }

    // == Start ==
    /// Installs and, if that succeeds, activates. Returns the resulting state.
    ///
    /// An install failure leaves the worker in `Installing` so a later call can retry.
    pub async fn start(&self) -> Result<LifecycleState> {
        self.dispatch(WorkerEvent::Install).await?;
        self.dispatch(WorkerEvent::Activate).await?;
        Ok(self.state().await)
    }

    // == Dispatch ==
    /// Handles one event to completion.
    ///
    /// Only install failures surface as errors; every other failure path resolves
    /// to a response, a reply or a log line.
    pub async fn dispatch(&self, event: WorkerEvent) -> Result<DispatchOutcome> {
        let name = event.name();
        let state = self.state().await;
        let effects = handle_event(&self.ctx, state, event, Utc::now());
        debug!(event = name, %state, effects = effects.len(), "Dispatching worker event");

        let mut outcome = DispatchOutcome::default();
        for effect in effects {
            self.run(effect, &mut outcome).await?;
        }
        Ok(outcome)
    }

    async fn run(&self, effect: Effect, outcome: &mut DispatchOutcome) -> Result<()> {
        match effect {
            Effect::Precache { generation, urls } => {
                self.precache(&generation, &urls).await?;
                *self.state.write().await = LifecycleState::WaitingToActivate;
                info!("Installed cache generation {} ({} shell assets)", generation, urls.len());
            }
            Effect::DeleteGenerationsExcept(keep) => {
                let deleted = self.storage.write().await.delete_except(&keep);
                for name in &deleted {
                    info!("Deleted stale cache generation {}", name);
                }
            }
            Effect::ClaimClients => {
                let clients = self.host.claim_clients().await;
                *self.state.write().await = LifecycleState::Active;
                info!("Worker active, claimed {} client(s)", clients.len());
            }
            Effect::Broadcast(message) => self.broadcast(&message).await,
            Effect::Respond(plan) => {
                outcome.response = Some(self.respond(plan).await);
            }
            Effect::ShowNotification { options, reply } => {
                let result = self.show(options).await;
                if reply {
                    outcome.reply = Some(match result {
                        Ok(()) => Reply::ok("Notification shown"),
                        Err(e) => Reply::failed(e.to_string()),
                    });
                }
            }
            Effect::CloseNotification(tag) => self.host.close_notification(tag.as_deref()).await,
            Effect::FocusOrOpen(url) => self.focus_or_open(&url).await,
            Effect::Reply(reply) => outcome.reply = Some(reply),
        }
        Ok(())
    }

    // == Precache ==
    /// Fetches every manifest URL, then commits all of them or none.
    async fn precache(&self, generation: &str, urls: &[String]) -> Result<()> {
        let mut batch = Vec::with_capacity(urls.len());
        for url in urls {
            let response = self
                .fetcher
                .fetch(&FetchRequest::get(url.as_str()))
                .await
                .map_err(|e| AppError::InstallFailed(format!("{}: {}", url, e)))?;

            if !response.is_cacheable() {
                return Err(AppError::InstallFailed(format!(
                    "{} returned uncacheable response (status {})",
                    url, response.status
                )));
            }
            batch.push((url.clone(), response));
        }

        self.storage
            .write()
            .await
            .put_all(generation, batch)
            .map_err(|e| AppError::InstallFailed(e.to_string()))
    }

    // == Respond ==
    async fn respond(&self, plan: FetchPlan) -> CachedResponse {
        let version = self.ctx.cache_version.as_str();
        match plan {
            FetchPlan::Passthrough(request) => match self.fetcher.fetch(&request).await {
                Ok(response) => response,
                Err(e) => {
                    warn!("Pass-through request failed: {}", e);
                    CachedResponse::network_error(&e.to_string())
                }
            },

            FetchPlan::NetworkFirst(request) => match self.fetcher.fetch(&request).await {
                Ok(response) => response,
                Err(e) => {
                    debug!("Network failed for {}: {}, trying cache", request.url, e);
                    let cached = self.storage.write().await.match_url(&request.url, version);
                    match cached {
                        Some(response) => {
                            self.storage.write().await.record_network_fallback();
                            response
                        }
                        None => self.offline().await,
                    }
                }
            },

            FetchPlan::CacheFirst(request) => {
                let cached = self.storage.write().await.match_url(&request.url, version);
                if let Some(response) = cached {
                    return response;
                }

                match self.fetcher.fetch(&request).await {
                    Ok(response) => {
                        if response.is_cacheable() {
                            let stored = self
                                .storage
                                .write()
                                .await
                                .put(version, &request.url, response.clone());
                            if let Err(e) = stored {
                                warn!("Could not cache {}: {}", request.url, e);
                            }
                        }
                        response
                    }
                    Err(e) => {
                        debug!("Network failed for {}: {}", request.url, e);
                        self.offline().await
                    }
                }
            }
        }
    }

    async fn offline(&self) -> CachedResponse {
        self.storage.write().await.record_offline_page();
        CachedResponse::offline_fallback()
    }

    // == Notifications ==
    /// Shows a notification; on failure shows the error card instead.
    async fn show(&self, options: NotificationOptions) -> Result<()> {
        match self.host.show_notification(&options).await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!("Failed to show notification '{}': {}", options.title, e);
                if !options.is_error_card() {
                    let card = normalize(
                        NotificationOptions::error_card(&e.to_string()),
                        &self.ctx.notification_defaults,
                        Utc::now(),
                    );
                    if let Err(card_err) = self.host.show_notification(&card).await {
                        error!("Failed to show notification error card: {}", card_err);
                    }
                }
                Err(e)
            }
        }
    }

    async fn broadcast(&self, message: &WorkerMessage) {
        for client in self.host.client_windows().await {
            if let Err(e) = self.host.post_message(&client.id, message).await {
                warn!("Could not notify client {}: {}", client.id, e);
            }
        }
    }

    async fn focus_or_open(&self, url: &str) {
        let clients = self.host.client_windows().await;
        let result = match clients.iter().find(|c| c.url == url) {
            Some(client) => self.host.focus_client(&client.id).await,
            None => self.host.open_window(url).await.map(|_| ()),
        };
        if let Err(e) = result {
            warn!("Could not focus or open {}: {}", url, e);
        }
    }
}
