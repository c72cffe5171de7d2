//! Host push service seam.
//!
//! The host owns the push subscription record; anything held locally is a
//! cached reference and is re-queried before it is trusted.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::push::capability::HostProfile;
use crate::push::vapid::VapidKey;

/// Key material of a subscription, base64url encoded as the host reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// Host-issued push credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

/// Notification permission as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    Granted,
    Denied,
    /// Not asked yet
    Default,
}

impl PermissionState {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionState::Granted)
    }
}

/// Failures reported by the host push API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PushHostError {
    #[error("push messaging is not supported")]
    NotSupported,

    #[error("notification permission denied: {0}")]
    NotAllowed(String),

    /// Push service unreachable because a privacy shield or extension blocks it
    #[error("push service blocked: {0}")]
    Blocked(String),

    #[error("push service unreachable: {0}")]
    Network(String),

    #[error("push registration aborted: {0}")]
    Aborted(String),

    #[error("push manager in invalid state: {0}")]
    InvalidState(String),
}

impl PushHostError {
    /// Permission and platform failures will not change on retry.
    pub fn is_transient(&self) -> bool {
        !matches!(self, PushHostError::NotSupported | PushHostError::NotAllowed(_))
    }
}

/// Browser push and notification APIs as seen from the main client context.
#[async_trait]
pub trait PushHost: Send + Sync {
    /// Capability and identity probe; called once per session.
    async fn profile(&self) -> HostProfile;

    async fn permission_state(&self) -> Result<PermissionState, PushHostError>;

    /// Shows the host permission prompt.
    async fn request_permission(&self) -> Result<PermissionState, PushHostError>;

    async fn get_subscription(&self) -> Result<Option<PushSubscription>, PushHostError>;

    async fn subscribe(&self, key: &VapidKey) -> Result<PushSubscription, PushHostError>;

    /// Returns whether the host removed a subscription.
    async fn unsubscribe(&self, subscription: &PushSubscription) -> Result<bool, PushHostError>;
}
