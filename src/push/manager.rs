//! Subscription Manager
//!
//! Obtains and maintains one push subscription per browser profile and keeps
//! the server copy in sync. The host is the source of truth: the cached
//! reference held here is refreshed on every query and never trusted on its own.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{SubscriptionRequest, TestNotificationRequest, UnsubscribeRequest};
use crate::push::capability::SessionContext;
use crate::push::host::{PermissionState, PushHost, PushHostError, PushSubscription};
use crate::push::retry::RetryPolicy;
use crate::push::vapid::VapidKey;
use crate::remote::RemoteApi;

/// Maps a host failure outside the retry loop onto the crate taxonomy.
fn host_error(err: PushHostError) -> AppError {
    match err {
        PushHostError::NotSupported => AppError::Unsupported("push messaging is not supported".to_string()),
        PushHostError::NotAllowed(reason) => AppError::PermissionDenied(reason),
        other => AppError::Transport(other.to_string()),
    }
}

// == Subscription Manager ==
/// Session-scoped owner of the push subscription lifecycle.
pub struct SubscriptionManager {
    host: Arc<dyn PushHost>,
    remote: Arc<dyn RemoteApi>,
    session: SessionContext,
    policy: RetryPolicy,
    /// Last subscription seen on the host
    cached: Mutex<Option<PushSubscription>>,
    /// Subscription created locally whose server POST failed
    pending: Mutex<Option<SubscriptionRequest>>,
    /// Serialises subscribe calls
    in_flight: Mutex<()>,
}

impl SubscriptionManager {
    /// Probes the host once and sizes the retry budget for its browser family.
    pub async fn new(config: &Config, host: Arc<dyn PushHost>, remote: Arc<dyn RemoteApi>) -> Self {
        let session = SessionContext::probe(host.as_ref()).await;
        info!(browser = ?session.browser, push = session.capabilities.supports_push(), "Push session probed");
        Self::with_session(config, session, host, remote)
    }

    pub fn with_session(
        config: &Config,
        session: SessionContext,
        host: Arc<dyn PushHost>,
        remote: Arc<dyn RemoteApi>,
    ) -> Self {
        let policy = RetryPolicy::for_session(config, &session);
        Self {
            host,
            remote,
            session,
            policy,
            cached: Mutex::new(None),
            pending: Mutex::new(None),
            in_flight: Mutex::new(()),
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Actionable guidance for an error returned by this manager.
    pub fn remediation(&self, err: &AppError) -> Option<String> {
        self.session.remediation(err)
    }

    /// Fetches and decodes the server VAPID key. Any failure means no key.
    pub async fn get_vapid_key(&self) -> Result<VapidKey> {
        let body = self.remote.get_vapid_key().await?;
        VapidKey::from_envelope(body)
    }

    /// Re-queries the host and refreshes the cached reference.
    pub async fn current_subscription(&self) -> Result<Option<PushSubscription>> {
        if !self.session.capabilities.supports_push() {
            return Ok(None);
        }
        let fresh = self.host.get_subscription().await.map_err(host_error)?;
        *self.cached.lock().await = fresh.clone();
        Ok(fresh)
    }

    /// Last subscription seen on the host, without re-querying.
    pub async fn cached_subscription(&self) -> Option<PushSubscription> {
        self.cached.lock().await.clone()
    }

    // == Subscribe ==
    /// Returns the existing subscription if there is one; otherwise subscribes
    /// with bounded retry and reports it to the server. A failed server POST
    /// is kept as pending and does not fail the call.
    pub async fn subscribe(&self, email: &str) -> Result<PushSubscription> {
        let _guard = self.in_flight.lock().await;

        if !self.session.capabilities.supports_push() {
            return Err(AppError::Unsupported("push messaging is not available".to_string()));
        }
        let permission = self.host.permission_state().await.map_err(host_error)?;
        if !permission.is_granted() {
            return Err(AppError::PermissionDenied(format!(
                "notification permission is {:?}",
                permission
            )));
        }

        if let Some(existing) = self.current_subscription().await? {
            debug!(endpoint = %existing.endpoint, "Reusing existing push subscription");
            return Ok(existing);
        }

        let key = self.get_vapid_key().await?;
        let subscription = self
            .policy
            .run(|attempt| {
                let host = Arc::clone(&self.host);
                let key = key.clone();
                async move {
                    debug!(attempt, "Subscribing to push service");
                    host.subscribe(&key).await
                }
            })
            .await
            .map_err(|exhausted| {
                if exhausted.last_error.is_transient() {
                    AppError::SubscribeFailed {
                        attempts: exhausted.attempts,
                        source: exhausted.last_error,
                    }
                } else {
                    host_error(exhausted.last_error)
                }
            })?;

        info!(endpoint = %subscription.endpoint, "Push subscription created");
        *self.cached.lock().await = Some(subscription.clone());

        let request = SubscriptionRequest {
            endpoint: subscription.endpoint.clone(),
            keys: subscription.keys.clone(),
            email: email.to_string(),
        };
        if let Err(e) = self.remote.post_subscription(&request).await {
            warn!(error = %e, "Server did not store push subscription; will retry");
            *self.pending.lock().await = Some(request);
        } else {
            *self.pending.lock().await = None;
        }

        Ok(subscription)
    }

    // == Unsubscribe ==
    /// Removes the host subscription and tells the server. Returns `false`
    /// when there was nothing to remove.
    pub async fn unsubscribe(&self) -> Result<bool> {
        let Some(subscription) = self.current_subscription().await? else {
            return Ok(false);
        };

        let removed = self
            .host
            .unsubscribe(&subscription)
            .await
            .map_err(host_error)?;
        *self.cached.lock().await = None;

        {
            let mut pending = self.pending.lock().await;
            if pending.as_ref().is_some_and(|p| p.endpoint == subscription.endpoint) {
                *pending = None;
            }
        }

        let request = UnsubscribeRequest {
            endpoint: subscription.endpoint.clone(),
        };
        if let Err(e) = self.remote.delete_subscription(&request).await {
            warn!(error = %e, endpoint = %subscription.endpoint, "Server did not remove push subscription");
        }

        info!(endpoint = %subscription.endpoint, removed, "Push subscription removed");
        Ok(removed)
    }

    /// Never fails; any host error reads as "not subscribed".
    pub async fn is_subscribed(&self) -> bool {
        match self.current_subscription().await {
            Ok(subscription) => subscription.is_some(),
            Err(e) => {
                debug!(error = %e, "Subscription query failed");
                false
            }
        }
    }

    /// Shows the host prompt. Unsupported platforms and failures read as denied.
    pub async fn request_permission(&self) -> PermissionState {
        if !self.session.capabilities.has_notification_api {
            return PermissionState::Denied;
        }
        match self.host.request_permission().await {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "Permission request failed");
                PermissionState::Denied
            }
        }
    }

    pub async fn send_test_notification(&self, user_id: &str) -> Result<()> {
        let request = TestNotificationRequest {
            user_id: user_id.to_string(),
        };
        self.remote.send_test_notification(&request).await
    }

    pub async fn has_pending_sync(&self) -> bool {
        self.pending.lock().await.is_some()
    }

    /// Re-posts a subscription the server has not stored yet. Returns whether
    /// anything was sent; on failure the record stays pending.
    pub async fn retry_pending_sync(&self) -> Result<bool> {
        let mut pending = self.pending.lock().await;
        let Some(request) = pending.as_ref() else {
            return Ok(false);
        };

        self.remote.post_subscription(request).await?;
        info!(endpoint = %request.endpoint, "Pending push subscription synced");
        *pending = None;
        Ok(true)
    }
}
