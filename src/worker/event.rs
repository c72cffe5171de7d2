//! Events dispatched to the worker and the effects it asks the driver to perform.

use axum::http::Method;
use serde_json::Value;

use crate::worker::messages::{Reply, WorkerMessage};
use crate::worker::notification::{NotificationData, NotificationOptions};
use crate::worker::routing::FetchPlan;

/// An outgoing request intercepted from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub method: Method,
    /// Absolute URL
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }
}

/// A notification the user interacted with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickedNotification {
    pub tag: Option<String>,
    pub data: NotificationData,
    /// Action button id, `None` for a click on the body
    pub action: Option<String>,
}

/// Host events, one variant per handler the worker registers.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(FetchRequest),
    /// Raw push payload, if the push carried one
    Push(Option<Vec<u8>>),
    Message { payload: Value, wants_reply: bool },
    NotificationClick(ClickedNotification),
}

impl WorkerEvent {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            WorkerEvent::Install => "install",
            WorkerEvent::Activate => "activate",
            WorkerEvent::Fetch(_) => "fetch",
            WorkerEvent::Push(_) => "push",
            WorkerEvent::Message { .. } => "message",
            WorkerEvent::NotificationClick(_) => "notificationclick",
        }
    }
}

/// Work the driver performs on behalf of a handled event.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Fetch every URL and commit them all to `generation`, or nothing
    Precache { generation: String, urls: Vec<String> },
    /// Drop every generation except the named one
    DeleteGenerationsExcept(String),
    ClaimClients,
    Broadcast(WorkerMessage),
    Respond(FetchPlan),
    /// Show a notification; report the outcome when `reply` is set
    ShowNotification { options: NotificationOptions, reply: bool },
    CloseNotification(Option<String>),
    FocusOrOpen(String),
    Reply(Reply),
}
