//! In-memory backend for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::{AppError, Result};
use crate::models::{
    EventPreferenceUpdate, StoredEventPreference, SubscriptionRequest, TestNotificationRequest,
    UnsubscribeRequest,
};
use crate::prefs::UserPreferences;
use crate::remote::RemoteApi;

/// Uncompressed P-256 point (0x04 || X || Y), base64url without padding.
pub const TEST_VAPID_KEY: &str =
    "BAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8gISIjJCUmJygpKissLS4vMDEyMzQ1Njc4OTo7PD0-P0A";

#[derive(Default)]
struct FakeState {
    preferences: Option<Value>,
    saved_preferences: Vec<UserPreferences>,
    event_preferences: Vec<StoredEventPreference>,
    event_updates: Vec<EventPreferenceUpdate>,
    vapid: Option<Value>,
    subscriptions: Vec<SubscriptionRequest>,
    deletions: Vec<UnsubscribeRequest>,
    test_requests: Vec<TestNotificationRequest>,
    fail_reads: bool,
    fail_writes: bool,
    fail_subscription_posts: bool,
}

/// Records every call; each operation can be made to fail.
#[derive(Default)]
pub struct FakeRemote {
    state: Mutex<FakeState>,
}

impl FakeRemote {
    pub fn new() -> Self {
        let remote = Self::default();
        remote.set_vapid(json!({"success": true, "publicKey": TEST_VAPID_KEY}));
        remote
    }

    pub fn set_preferences(&self, value: Value) {
        self.state.lock().unwrap().preferences = Some(value);
    }

    pub fn set_event_preferences(&self, stored: Vec<(&str, bool)>) {
        self.state.lock().unwrap().event_preferences = stored
            .into_iter()
            .map(|(t, e)| StoredEventPreference {
                event_type: t.to_string(),
                is_enabled: e,
            })
            .collect();
    }

    pub fn set_vapid(&self, value: Value) {
        self.state.lock().unwrap().vapid = Some(value);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.state.lock().unwrap().fail_reads = fail;
    }

    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_writes = fail;
    }

    pub fn fail_subscription_posts(&self, fail: bool) {
        self.state.lock().unwrap().fail_subscription_posts = fail;
    }

    pub fn saved_preferences(&self) -> Vec<UserPreferences> {
        self.state.lock().unwrap().saved_preferences.clone()
    }

    pub fn event_updates(&self) -> Vec<EventPreferenceUpdate> {
        self.state.lock().unwrap().event_updates.clone()
    }

    pub fn subscriptions(&self) -> Vec<SubscriptionRequest> {
        self.state.lock().unwrap().subscriptions.clone()
    }

    pub fn deletions(&self) -> Vec<UnsubscribeRequest> {
        self.state.lock().unwrap().deletions.clone()
    }

    pub fn test_requests(&self) -> Vec<TestNotificationRequest> {
        self.state.lock().unwrap().test_requests.clone()
    }

    fn read_guard(&self) -> Result<()> {
        if self.state.lock().unwrap().fail_reads {
            return Err(AppError::Transport("backend unreachable".to_string()));
        }
        Ok(())
    }

    fn write_guard(&self) -> Result<()> {
        if self.state.lock().unwrap().fail_writes {
            return Err(AppError::Transport("backend unreachable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteApi for FakeRemote {
    async fn get_preferences(&self) -> Result<Value> {
        self.read_guard()?;
        Ok(self.state.lock().unwrap().preferences.clone().unwrap_or_else(|| json!({})))
    }

    async fn put_preferences(&self, preferences: &UserPreferences) -> Result<()> {
        self.write_guard()?;
        self.state.lock().unwrap().saved_preferences.push(preferences.clone());
        Ok(())
    }

    async fn get_event_preferences(&self) -> Result<Vec<StoredEventPreference>> {
        self.read_guard()?;
        Ok(self.state.lock().unwrap().event_preferences.clone())
    }

    async fn post_event_preference(&self, update: &EventPreferenceUpdate) -> Result<()> {
        self.write_guard()?;
        self.state.lock().unwrap().event_updates.push(update.clone());
        Ok(())
    }

    async fn get_vapid_key(&self) -> Result<Value> {
        self.read_guard()?;
        self.state
            .lock()
            .unwrap()
            .vapid
            .clone()
            .ok_or_else(|| AppError::Transport("vapid endpoint returned 404".to_string()))
    }

    async fn post_subscription(&self, request: &SubscriptionRequest) -> Result<()> {
        self.write_guard()?;
        let mut state = self.state.lock().unwrap();
        if state.fail_subscription_posts {
            return Err(AppError::Transport("push-subscriptions returned 503".to_string()));
        }
        state.subscriptions.push(request.clone());
        Ok(())
    }

    async fn delete_subscription(&self, request: &UnsubscribeRequest) -> Result<()> {
        self.write_guard()?;
        self.state.lock().unwrap().deletions.push(request.clone());
        Ok(())
    }

    async fn send_test_notification(&self, request: &TestNotificationRequest) -> Result<()> {
        self.write_guard()?;
        self.state.lock().unwrap().test_requests.push(request.clone());
        Ok(())
    }
}
