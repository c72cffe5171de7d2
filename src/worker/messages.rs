//! Messages exchanged between the worker and its client pages.

use serde::{Deserialize, Serialize};

use crate::worker::notification::NotificationOptions;

/// Message envelope, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WorkerMessage {
    /// Client asks the worker to display a notification
    #[serde(rename = "SHOW_NOTIFICATION")]
    ShowNotification {
        #[serde(default)]
        payload: NotificationOptions,
    },
    /// Worker tells each client it now controls the page
    #[serde(rename = "SERVICE_WORKER_READY")]
    ServiceWorkerReady,
}

/// Reply sent over a message's reply channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Reply {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}
