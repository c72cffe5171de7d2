//! Pure event handling.
//!
//! `handle_event` maps one host event to the effects the driver must run. It
//! never touches the network, the cache or the clock, which keeps every handler
//! testable without a live host.

use chrono::{DateTime, Utc};
use tracing::debug;
use url::Url;

use crate::config::{Config, CACHE_VERSION};
use crate::error::{AppError, Result};
use crate::worker::event::{Effect, WorkerEvent};
use crate::worker::lifecycle::LifecycleState;
use crate::worker::messages::{Reply, WorkerMessage};
use crate::worker::notification::{
    click_target, normalize, parse_push_payload, NotificationDefaults, DISMISS_ACTION,
};
use crate::worker::routing::route;

/// Everything the handlers need to know about the deployment.
#[derive(Debug, Clone)]
pub struct WorkerContext {
    /// Current cache generation tag
    pub cache_version: String,
    pub app_origin: Url,
    pub api_prefix: String,
    /// Absolute shell manifest URLs
    pub precache_urls: Vec<String>,
    pub notification_defaults: NotificationDefaults,
}

impl WorkerContext {
    /// Builds the context from configuration, resolving the manifest against the origin.
    pub fn from_config(config: &Config) -> Result<Self> {
        let app_origin = Url::parse(&config.upstream_origin).map_err(|e| {
            AppError::InvalidRequest(format!("invalid upstream origin {}: {}", config.upstream_origin, e))
        })?;

        let precache_urls = config
            .precache_urls
            .iter()
            .map(|path| {
                app_origin
                    .join(path)
                    .map(|u| u.to_string())
                    .map_err(|e| AppError::InvalidRequest(format!("invalid manifest entry {}: {}", path, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            cache_version: CACHE_VERSION.to_string(),
            app_origin,
            api_prefix: config.api_prefix.clone(),
            precache_urls,
            notification_defaults: NotificationDefaults::from(config),
        })
    }

    /// Replaces the generation tag (used when a new deployment is simulated).
    pub fn with_cache_version(mut self, version: impl Into<String>) -> Self {
        self.cache_version = version.into();
        self
    }
}

// == Handle Event ==
/// Decides what to do with one event given the current lifecycle state.
pub fn handle_event(
    ctx: &WorkerContext,
    state: LifecycleState,
    event: WorkerEvent,
    now: DateTime<Utc>,
) -> Vec<Effect> {
    match event {
        WorkerEvent::Install => {
            if !state.can_install() {
                debug!("Ignoring install in state {}", state);
                return Vec::new();
            }
            vec![Effect::Precache {
                generation: ctx.cache_version.clone(),
                urls: ctx.precache_urls.clone(),
            }]
        }

        WorkerEvent::Activate => {
            if !state.can_activate() {
                debug!("Ignoring activate in state {}", state);
                return Vec::new();
            }
            vec![
                Effect::DeleteGenerationsExcept(ctx.cache_version.clone()),
                Effect::ClaimClients,
                Effect::Broadcast(WorkerMessage::ServiceWorkerReady),
            ]
        }

        WorkerEvent::Fetch(request) => {
            vec![Effect::Respond(route(state, &ctx.api_prefix, request))]
        }

        WorkerEvent::Push(data) => {
            let options = parse_push_payload(data.as_deref());
            vec![Effect::ShowNotification {
                options: normalize(options, &ctx.notification_defaults, now),
                reply: false,
            }]
        }

        WorkerEvent::Message { payload, wants_reply } => {
            match serde_json::from_value::<WorkerMessage>(payload) {
                Ok(WorkerMessage::ShowNotification { payload }) => vec![Effect::ShowNotification {
                    options: normalize(payload, &ctx.notification_defaults, now),
                    reply: wants_reply,
                }],
                Ok(WorkerMessage::ServiceWorkerReady) => {
                    if wants_reply {
                        vec![Effect::Reply(Reply::ok(format!("active: {}", state.can_intercept_fetch())))]
                    } else {
                        Vec::new()
                    }
                }
                Err(e) => {
                    debug!("Unrecognised client message: {}", e);
                    if wants_reply {
                        vec![Effect::Reply(Reply::failed(format!("unrecognised message: {}", e)))]
                    } else {
                        Vec::new()
                    }
                }
            }
        }

        WorkerEvent::NotificationClick(clicked) => {
            let mut effects = vec![Effect::CloseNotification(clicked.tag.clone())];
            if clicked.action.as_deref() != Some(DISMISS_ACTION) {
                effects.push(Effect::FocusOrOpen(click_target(&clicked.data, &ctx.app_origin)));
            }
            effects
        }
    }
}
