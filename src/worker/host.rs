//! Host services available to the worker: notifications and client windows.

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;

use crate::error::{AppError, Result};
use crate::worker::messages::WorkerMessage;
use crate::worker::notification::NotificationOptions;

/// A page controlled (or controllable) by the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientWindow {
    pub id: String,
    pub url: String,
    pub focused: bool,
}

/// Host platform seam used by the driver.
#[async_trait]
pub trait WorkerHost: Send + Sync {
    async fn show_notification(&self, options: &NotificationOptions) -> Result<()>;

    async fn close_notification(&self, tag: Option<&str>);

    /// Takes control of every open client and returns them.
    async fn claim_clients(&self) -> Vec<ClientWindow>;

    async fn client_windows(&self) -> Vec<ClientWindow>;

    async fn focus_client(&self, id: &str) -> Result<()>;

    async fn open_window(&self, url: &str) -> Result<ClientWindow>;

    async fn post_message(&self, client_id: &str, message: &WorkerMessage) -> Result<()>;
}

#[derive(Debug, Default)]
struct LocalHostState {
    shown: Vec<NotificationOptions>,
    clients: Vec<ClientWindow>,
    claimed: bool,
    delivered: Vec<(String, WorkerMessage)>,
    next_id: u64,
    permission_granted: bool,
}

/// In-process host: keeps shown notifications, clients and delivered messages in memory.
#[derive(Debug)]
pub struct LocalHost {
    state: Mutex<LocalHostState>,
}

impl LocalHost {
    /// Creates a host with notification permission granted.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LocalHostState {
                permission_granted: true,
                ..Default::default()
            }),
        }
    }

    /// Creates a host that refuses to show notifications.
    pub fn without_permission() -> Self {
        Self {
            state: Mutex::new(LocalHostState::default()),
        }
    }

    /// Registers an open page.
    pub async fn register_client(&self, url: &str) -> ClientWindow {
        let mut state = self.state.lock().await;
        state.next_id += 1;
        let client = ClientWindow {
            id: format!("client-{}", state.next_id),
            url: url.to_string(),
            focused: false,
        };
        state.clients.push(client.clone());
        client
    }

    pub async fn shown(&self) -> Vec<NotificationOptions> {
        self.state.lock().await.shown.clone()
    }

    pub async fn delivered(&self) -> Vec<(String, WorkerMessage)> {
        self.state.lock().await.delivered.clone()
    }

    pub async fn is_claimed(&self) -> bool {
        self.state.lock().await.claimed
    }
}

impl Default for LocalHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkerHost for LocalHost {
    async fn show_notification(&self, options: &NotificationOptions) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.permission_granted {
            return Err(AppError::PermissionDenied("notification permission not granted".to_string()));
        }
        info!(title = %options.title, "Showing notification");
        state.shown.push(options.clone());
        Ok(())
    }

    async fn close_notification(&self, tag: Option<&str>) {
        let mut state = self.state.lock().await;
        match tag {
            Some(tag) => state.shown.retain(|n| n.tag.as_deref() != Some(tag)),
            None => {
                state.shown.pop();
            }
        }
    }

    async fn claim_clients(&self) -> Vec<ClientWindow> {
        let mut state = self.state.lock().await;
        state.claimed = true;
        state.clients.clone()
    }

    async fn client_windows(&self) -> Vec<ClientWindow> {
        self.state.lock().await.clients.clone()
    }

    async fn focus_client(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.clients.iter().any(|c| c.id == id) {
            return Err(AppError::InvalidRequest(format!("unknown client {}", id)));
        }
        for client in state.clients.iter_mut() {
            client.focused = client.id == id;
        }
        Ok(())
    }

    async fn open_window(&self, url: &str) -> Result<ClientWindow> {
        let client = self.register_client(url).await;
        self.focus_client(&client.id).await?;
        Ok(ClientWindow {
            focused: true,
            ..client
        })
    }

    async fn post_message(&self, client_id: &str, message: &WorkerMessage) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.clients.iter().any(|c| c.id == client_id) {
            return Err(AppError::InvalidRequest(format!("unknown client {}", client_id)));
        }
        state.delivered.push((client_id.to_string(), message.clone()));
        Ok(())
    }
}
