//! Canonical preference records and the raw shapes the server may return.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::prefs::reconcile::is_valid_email;

// == User Preferences ==
/// Canonical notification policy. Always fully populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub email: String,
    pub notify_email: bool,
    pub notify_browser: bool,
    pub notify_all_events: bool,
    #[serde(rename = "email1hBefore")]
    pub email_1h_before: bool,
    #[serde(rename = "email10mBefore")]
    pub email_10m_before: bool,
    #[serde(rename = "browser1hBefore")]
    pub browser_1h_before: bool,
    #[serde(rename = "browser10mBefore")]
    pub browser_10m_before: bool,
    pub notify_new_events: bool,
}

impl Default for UserPreferences {
    /// Email stays off until an address is known; everything else is on.
    fn default() -> Self {
        Self {
            email: String::new(),
            notify_email: false,
            notify_browser: true,
            notify_all_events: true,
            email_1h_before: true,
            email_10m_before: true,
            browser_1h_before: true,
            browser_10m_before: true,
            notify_new_events: true,
        }
    }
}

impl UserPreferences {
    /// Rejects email reminders without a usable address.
    pub fn validate(&self) -> Result<()> {
        if self.notify_email && !is_valid_email(&self.email) {
            let reason = if self.email.trim().is_empty() {
                "email reminders need an email address".to_string()
            } else {
                format!("'{}' is not a valid email address", self.email.trim())
            };
            return Err(AppError::InvalidPreferences(reason));
        }
        Ok(())
    }

    /// Re-enables both timings of a channel that is on with no timing at all.
    /// Returns whether anything changed.
    pub fn auto_correct(&mut self) -> bool {
        let mut changed = false;
        if self.notify_email && !self.email_1h_before && !self.email_10m_before {
            self.email_1h_before = true;
            self.email_10m_before = true;
            changed = true;
        }
        if self.notify_browser && !self.browser_1h_before && !self.browser_10m_before {
            self.browser_1h_before = true;
            self.browser_10m_before = true;
            changed = true;
        }
        changed
    }

    /// Neither channel is on with zero timings.
    pub fn timings_consistent(&self) -> bool {
        (!self.notify_email || self.email_1h_before || self.email_10m_before)
            && (!self.notify_browser || self.browser_1h_before || self.browser_10m_before)
    }
}

/// Per-type opt-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPreference {
    pub event_type: String,
    pub is_enabled: bool,
}

impl EventPreference {
    pub fn new(event_type: impl Into<String>, is_enabled: bool) -> Self {
        Self {
            event_type: event_type.into(),
            is_enabled,
        }
    }
}

// == Raw Server Record ==
/// Whatever the server stored: canonical or legacy, camel or snake case.
///
/// Each field is read on its own; a value of the wrong type reads as absent
/// instead of failing the whole record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawPreferences {
    #[serde(deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(rename = "notifyEmail", alias = "notify_email", deserialize_with = "lenient_bool")]
    pub notify_email: Option<bool>,
    #[serde(rename = "notifyBrowser", alias = "notify_browser", deserialize_with = "lenient_bool")]
    pub notify_browser: Option<bool>,
    #[serde(rename = "notifyAllEvents", alias = "notify_all_events", deserialize_with = "lenient_bool")]
    pub notify_all_events: Option<bool>,
    #[serde(
        rename = "email1hBefore",
        alias = "email_1h_before",
        alias = "email1h_before",
        deserialize_with = "lenient_bool"
    )]
    pub email_1h_before: Option<bool>,
    #[serde(
        rename = "email10mBefore",
        alias = "email_10m_before",
        alias = "email10m_before",
        deserialize_with = "lenient_bool"
    )]
    pub email_10m_before: Option<bool>,
    #[serde(
        rename = "browser1hBefore",
        alias = "browser_1h_before",
        alias = "browser1h_before",
        deserialize_with = "lenient_bool"
    )]
    pub browser_1h_before: Option<bool>,
    #[serde(
        rename = "browser10mBefore",
        alias = "browser_10m_before",
        alias = "browser10m_before",
        deserialize_with = "lenient_bool"
    )]
    pub browser_10m_before: Option<bool>,
    #[serde(rename = "notifyNewEvents", alias = "notify_new_events", deserialize_with = "lenient_bool")]
    pub notify_new_events: Option<bool>,
    /// Legacy single-pair reminder flags
    #[serde(
        rename = "notify1hBefore",
        alias = "notify_1h_before",
        alias = "notify1h_before",
        deserialize_with = "lenient_bool"
    )]
    pub notify_1h_before: Option<bool>,
    #[serde(
        rename = "notify10mBefore",
        alias = "notify_10m_before",
        alias = "notify10m_before",
        deserialize_with = "lenient_bool"
    )]
    pub notify_10m_before: Option<bool>,
}

/// Accepts `true`/`false`, `0`/`1` and their string forms. Anything else is absent.
fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let flag = match Value::deserialize(deserializer)? {
        Value::Bool(b) => Some(b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    };
    Ok(flag)
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

impl RawPreferences {
    pub fn has_channel_timings(&self) -> bool {
        self.email_1h_before.is_some()
            || self.email_10m_before.is_some()
            || self.browser_1h_before.is_some()
            || self.browser_10m_before.is_some()
    }

    pub fn has_legacy_timings(&self) -> bool {
        self.notify_1h_before.is_some() || self.notify_10m_before.is_some()
    }
}
