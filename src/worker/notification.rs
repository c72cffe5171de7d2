//! Notification payloads handled by the worker.
//!
//! Push payloads are parsed leniently: structured JSON first, then plain text,
//! then a generic reminder. Anything that still goes wrong becomes an error card
//! so a push never ends silently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// Vibration pattern applied to every notification
pub const DEFAULT_VIBRATION: [u32; 3] = [200, 100, 200];

const DEFAULT_TITLE: &str = "Calendar notification";
const FALLBACK_TITLE: &str = "Calendar reminder";
const FALLBACK_BODY: &str = "You have an upcoming event.";
const ERROR_TITLE: &str = "Notification error";
const ERROR_TAG: &str = "notification-error";

/// Action id that only closes the notification
pub const DISMISS_ACTION: &str = "dismiss";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// Data carried with a notification to resolve click targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_at: Option<String>,
}

/// Fields accepted by the host's show-notification call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationOptions {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vibrate: Option<Vec<u32>>,
    pub require_interaction: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<NotificationAction>,
    pub data: NotificationData,
    /// Receipt time, Unix milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl NotificationOptions {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    /// Generic reminder shown when a push carries nothing usable.
    pub fn fallback() -> Self {
        Self::new(FALLBACK_TITLE, FALLBACK_BODY)
    }

    /// Terminal card shown when parsing or display failed.
    pub fn error_card(detail: &str) -> Self {
        let mut card = Self::new(
            ERROR_TITLE,
            format!("A calendar notification could not be displayed ({}).", detail),
        );
        card.tag = Some(ERROR_TAG.to_string());
        card
    }

    pub fn is_error_card(&self) -> bool {
        self.tag.as_deref() == Some(ERROR_TAG)
    }
}

/// Defaults filled in when a payload omits them.
#[derive(Debug, Clone)]
pub struct NotificationDefaults {
    pub icon: String,
    pub badge: String,
}

impl From<&crate::config::Config> for NotificationDefaults {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            icon: config.notification_icon.clone(),
            badge: config.notification_badge.clone(),
        }
    }
}

// == Normalize ==
/// Fills missing presentation fields and stamps the receipt time.
pub fn normalize(
    mut options: NotificationOptions,
    defaults: &NotificationDefaults,
    received_at: DateTime<Utc>,
) -> NotificationOptions {
    if options.title.trim().is_empty() {
        options.title = DEFAULT_TITLE.to_string();
    }
    if options.icon.as_deref().map_or(true, str::is_empty) {
        options.icon = Some(defaults.icon.clone());
    }
    if options.badge.as_deref().map_or(true, str::is_empty) {
        options.badge = Some(defaults.badge.clone());
    }
    options.vibrate = Some(DEFAULT_VIBRATION.to_vec());
    options.timestamp = Some(received_at.timestamp_millis());
    options.data.received_at = Some(received_at.to_rfc3339());
    options
}

// == Parse Push Payload ==
/// Turns raw push bytes into notification options.
pub fn parse_push_payload(data: Option<&[u8]>) -> NotificationOptions {
    let bytes = match data {
        Some(b) if !b.iter().all(u8::is_ascii_whitespace) => b,
        _ => return NotificationOptions::fallback(),
    };

    match serde_json::from_slice::<Value>(bytes) {
        Ok(value @ Value::Object(_)) => match serde_json::from_value(value) {
            Ok(options) => options,
            Err(e) => NotificationOptions::error_card(&format!("invalid payload: {}", e)),
        },
        Ok(Value::String(text)) => NotificationOptions::new(FALLBACK_TITLE, text),
        _ => match std::str::from_utf8(bytes) {
            Ok(text) => NotificationOptions::new(FALLBACK_TITLE, text.trim()),
            Err(_) => NotificationOptions::fallback(),
        },
    }
}

// == Click Target ==
/// Resolves where a click should navigate: explicit url, else the event page, else root.
pub fn click_target(data: &NotificationData, origin: &Url) -> String {
    let root = origin.join("/").unwrap_or_else(|_| origin.clone());

    if let Some(url) = data.url.as_deref().filter(|u| !u.trim().is_empty()) {
        if let Ok(resolved) = root.join(url) {
            return resolved.to_string();
        }
    }

    if let Some(event_id) = data.event_id.as_deref().filter(|id| !id.trim().is_empty()) {
        let mut target = root.clone();
        target.query_pairs_mut().append_pair("event", event_id);
        return target.to_string();
    }

    root.to_string()
}
