//! Preference reads and writes against the remote API.
//!
//! Display reads never fail: the calendar stays usable on defaults. Writes
//! propagate errors so the settings view can report a failed save, and never
//! build on those defaults.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::models::EventPreferenceUpdate;
use crate::prefs::debounce::DebounceSink;
use crate::prefs::model::{EventPreference, UserPreferences};
use crate::prefs::reconcile::{
    derive_event_preferences, fallback_event_preferences, reconcile_preferences,
};
use crate::remote::RemoteApi;

#[derive(Clone)]
pub struct PreferenceService {
    remote: Arc<dyn RemoteApi>,
}

impl PreferenceService {
    pub fn new(remote: Arc<dyn RemoteApi>) -> Self {
        Self { remote }
    }

    // == Reads ==
    pub async fn load_preferences(&self) -> UserPreferences {
        match self.try_load_preferences().await {
            Ok(preferences) => preferences,
            Err(e) => {
                warn!(error = %e, "Could not load preferences; using defaults");
                UserPreferences::default()
            }
        }
    }

    /// Strict read for read-modify-write paths.
    pub async fn try_load_preferences(&self) -> Result<UserPreferences> {
        let body = self.remote.get_preferences().await?;
        Ok(reconcile_preferences(&body))
    }

    /// One record per observed event type. When the stored records cannot be
    /// read, every type follows `notify_all_events`.
    pub async fn load_event_preferences<S: AsRef<str> + Sync>(
        &self,
        candidates: &[S],
        notify_all_events: bool,
    ) -> Vec<EventPreference> {
        match self.remote.get_event_preferences().await {
            Ok(stored) => derive_event_preferences(candidates, &stored, notify_all_events),
            Err(e) => {
                warn!(error = %e, "Could not load event preferences");
                fallback_event_preferences(candidates, notify_all_events)
            }
        }
    }

    // == Writes ==
    /// Validates, auto-corrects and stores the record. Returns what was sent.
    pub async fn save_preferences(&self, mut preferences: UserPreferences) -> Result<UserPreferences> {
        preferences.email = preferences.email.trim().to_string();
        preferences.validate()?;
        if preferences.auto_correct() {
            info!("Re-enabled reminder timings for a channel with none selected");
        }
        self.remote.put_preferences(&preferences).await?;
        Ok(preferences)
    }

    /// Writes one event-type record; independent of the bulk record.
    pub async fn set_event_preference(&self, event_type: &str, is_enabled: bool) -> Result<()> {
        let update = EventPreferenceUpdate {
            event_type: event_type.trim().to_string(),
            is_enabled,
        };
        if let Some(reason) = update.validate() {
            return Err(AppError::InvalidPreferences(reason));
        }
        self.remote.post_event_preference(&update).await
    }

    /// Replaces the email on the stored record and writes it back. Fails
    /// without writing when the stored record cannot be read.
    pub async fn update_email(&self, email: &str) -> Result<UserPreferences> {
        let mut preferences = self.try_load_preferences().await?;
        preferences.email = email.to_string();
        self.save_preferences(preferences).await
    }
}

/// Debounce target that persists an edited email address.
pub struct EmailUpdateSink {
    service: PreferenceService,
}

impl EmailUpdateSink {
    pub fn new(service: PreferenceService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl DebounceSink<String> for EmailUpdateSink {
    async fn deliver(&self, value: String) {
        match self.service.update_email(&value).await {
            Ok(_) => info!("Email preference saved"),
            Err(e) => warn!(error = %e, "Email preference not saved"),
        }
    }
}
