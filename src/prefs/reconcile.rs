//! Preference Reconciler
//!
//! Pure functions that turn whatever the server returns into one canonical
//! `UserPreferences` record and one list of `EventPreference` records.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::{debug, warn};

use crate::models::StoredEventPreference;
use crate::prefs::model::{EventPreference, RawPreferences, UserPreferences};

/// Loose syntactic check: `local@domain.tld`, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

// == Preferences ==
/// Builds the canonical record from a raw server body.
///
/// Legacy records (`notify1hBefore` / `notify10mBefore` with no channel
/// timings) map their timing onto both channels, missing flags reading as
/// `true`. Canonical records merge over the defaults field by field, so a
/// mistyped value only loses that one field. A body that is not an object
/// yields the defaults.
pub fn reconcile_preferences(body: &Value) -> UserPreferences {
    let record = match body.get("preferences") {
        Some(inner) if inner.is_object() => inner,
        _ => body,
    };
    if !record.is_object() {
        debug!("Preference body is not an object; using defaults");
        return UserPreferences::default();
    }

    let raw: RawPreferences = match serde_json::from_value(record.clone()) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "Unreadable preference record; using defaults");
            return UserPreferences::default();
        }
    };

    let defaults = UserPreferences::default();
    let mut prefs = UserPreferences {
        email: raw.email.clone().unwrap_or(defaults.email),
        notify_email: raw.notify_email.unwrap_or(defaults.notify_email),
        notify_browser: raw.notify_browser.unwrap_or(defaults.notify_browser),
        notify_all_events: raw.notify_all_events.unwrap_or(defaults.notify_all_events),
        notify_new_events: raw.notify_new_events.unwrap_or(defaults.notify_new_events),
        ..defaults
    };

    if raw.has_legacy_timings() && !raw.has_channel_timings() {
        let one_hour = raw.notify_1h_before.unwrap_or(true);
        let ten_minutes = raw.notify_10m_before.unwrap_or(true);
        debug!(one_hour, ten_minutes, "Migrating legacy reminder timings");
        prefs.email_1h_before = one_hour;
        prefs.browser_1h_before = one_hour;
        prefs.email_10m_before = ten_minutes;
        prefs.browser_10m_before = ten_minutes;
    } else {
        prefs.email_1h_before = raw.email_1h_before.unwrap_or(prefs.email_1h_before);
        prefs.email_10m_before = raw.email_10m_before.unwrap_or(prefs.email_10m_before);
        prefs.browser_1h_before = raw.browser_1h_before.unwrap_or(prefs.browser_1h_before);
        prefs.browser_10m_before = raw.browser_10m_before.unwrap_or(prefs.browser_10m_before);
    }

    prefs
}

// == Event Preferences ==
/// Derives one record per distinct, non-blank candidate in first-seen order.
///
/// With nothing stored every candidate is enabled. Otherwise a stored record
/// wins and unknown types follow `notify_all_events`.
pub fn derive_event_preferences<S: AsRef<str>>(
    candidates: &[S],
    stored: &[StoredEventPreference],
    notify_all_events: bool,
) -> Vec<EventPreference> {
    let new_user = stored.is_empty();
    let lookup: HashMap<&str, bool> = stored
        .iter()
        .map(|p| (p.event_type.as_str(), p.is_enabled))
        .collect();

    distinct_types(candidates)
        .into_iter()
        .map(|event_type| {
            let is_enabled = if new_user {
                true
            } else {
                lookup.get(event_type).copied().unwrap_or(notify_all_events)
            };
            EventPreference::new(event_type, is_enabled)
        })
        .collect()
}

/// Used when the stored records could not be read: every candidate follows
/// `notify_all_events`.
pub fn fallback_event_preferences<S: AsRef<str>>(
    candidates: &[S],
    notify_all_events: bool,
) -> Vec<EventPreference> {
    distinct_types(candidates)
        .into_iter()
        .map(|event_type| EventPreference::new(event_type, notify_all_events))
        .collect()
}

fn distinct_types<S: AsRef<str>>(candidates: &[S]) -> Vec<&str> {
    let mut seen = HashSet::new();
    candidates
        .iter()
        .map(|c| c.as_ref().trim())
        .filter(|c| !c.is_empty() && seen.insert(*c))
        .collect()
}
