//! Session capability probe.
//!
//! Capabilities and browser family are probed once per settings session and
//! passed down, instead of being re-detected at every call site.

use serde::Serialize;

use crate::config::Config;
use crate::error::AppError;
use crate::push::host::{PushHost, PushHostError};

/// Which host APIs exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Capabilities {
    pub has_service_worker: bool,
    pub has_push_manager: bool,
    pub has_notification_api: bool,
}

impl Capabilities {
    pub fn all() -> Self {
        Self {
            has_service_worker: true,
            has_push_manager: true,
            has_notification_api: true,
        }
    }

    /// Push needs both a worker registration and a push manager.
    pub fn supports_push(&self) -> bool {
        self.has_service_worker && self.has_push_manager
    }
}

/// Raw probe result reported by the host.
#[derive(Debug, Clone, Default)]
pub struct HostProfile {
    pub capabilities: Capabilities,
    pub user_agent: String,
    /// Brave reports a Chrome user agent; it is identified by an explicit marker
    pub brave_marker: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserFamily {
    Brave,
    Edge,
    Opera,
    Chrome,
    Firefox,
    Safari,
    Other,
}

impl BrowserFamily {
    pub fn detect(user_agent: &str, brave_marker: bool) -> Self {
        if brave_marker {
            return BrowserFamily::Brave;
        }
        let ua = user_agent;
        if ua.contains("Edg/") || ua.contains("Edge/") {
            BrowserFamily::Edge
        } else if ua.contains("OPR/") || ua.contains("Opera") {
            BrowserFamily::Opera
        } else if ua.contains("Firefox/") {
            BrowserFamily::Firefox
        } else if ua.contains("Chrome/") || ua.contains("Chromium/") {
            BrowserFamily::Chrome
        } else if ua.contains("Safari/") {
            BrowserFamily::Safari
        } else {
            BrowserFamily::Other
        }
    }

    /// Families whose push service registration fails intermittently.
    pub fn has_flaky_push(&self) -> bool {
        matches!(self, BrowserFamily::Brave | BrowserFamily::Edge)
    }

    fn permission_help(&self) -> &'static str {
        match self {
            BrowserFamily::Brave | BrowserFamily::Chrome | BrowserFamily::Edge | BrowserFamily::Opera => {
                "Click the lock icon in the address bar and allow notifications for this site."
            }
            BrowserFamily::Firefox => {
                "Open the permissions panel next to the address bar and allow notifications."
            }
            BrowserFamily::Safari => {
                "Open Safari settings, Websites, Notifications and allow this site."
            }
            BrowserFamily::Other => "Allow notifications for this site in your browser settings.",
        }
    }
}

/// Probed once per settings session and owned by the subscription manager.
#[derive(Debug, Clone, Serialize)]
pub struct SessionContext {
    pub capabilities: Capabilities,
    pub browser: BrowserFamily,
}

impl SessionContext {
    pub fn new(capabilities: Capabilities, browser: BrowserFamily) -> Self {
        Self {
            capabilities,
            browser,
        }
    }

    /// Probes the host once.
    pub async fn probe(host: &dyn PushHost) -> Self {
        let profile = host.profile().await;
        Self {
            capabilities: profile.capabilities,
            browser: BrowserFamily::detect(&profile.user_agent, profile.brave_marker),
        }
    }

    pub fn uses_flaky_retry(&self, config: &Config) -> bool {
        self.browser.has_flaky_push() && config.flaky_subscribe_attempts > 0
    }

    /// User-facing guidance for an error, if there is something actionable.
    pub fn remediation(&self, err: &AppError) -> Option<String> {
        match err {
            AppError::PermissionDenied(_) => Some(self.browser.permission_help().to_string()),
            AppError::Unsupported(_) => {
                Some("This browser cannot receive push notifications. Email reminders still work.".to_string())
            }
            AppError::SubscribeFailed {
                source: PushHostError::Blocked(_),
                ..
            } if self.browser == BrowserFamily::Brave => Some(
                "Brave blocks push services by default. Enable \"Use Google services for push messaging\" \
                 in brave://settings/privacy and try again."
                    .to_string(),
            ),
            AppError::SubscribeFailed {
                source: PushHostError::Blocked(_),
                ..
            } => Some("A privacy extension is blocking the push service. Allow it for this site.".to_string()),
            AppError::SubscribeFailed { .. } | AppError::Transport(_) => {
                Some("Check your connection and try again.".to_string())
            }
            _ => None,
        }
    }
}
