//! Remote API Module
//!
//! Client seam for the calendar backend: preferences, event-type preferences,
//! VAPID key and push subscription endpoints.

mod http;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::models::{
    EventPreferenceUpdate, StoredEventPreference, SubscriptionRequest, TestNotificationRequest,
    UnsubscribeRequest,
};
use crate::prefs::UserPreferences;

pub use http::HttpRemote;

// == Endpoint Paths ==
/// Paths are relative so a base URL with a path prefix is honoured.
pub const PREFERENCES_PATH: &str = "api/users/me/preferences";
pub const EVENT_PREFERENCES_PATH: &str = "api/users/me/event-preferences";
pub const VAPID_KEY_PATH: &str = "api/notifications/vapid-public-key";
pub const PUSH_SUBSCRIPTIONS_PATH: &str = "api/users/me/push-subscriptions";
pub const TEST_NOTIFICATION_PATH: &str = "api/notifications/test";

/// Calendar backend operations consumed by the subscription manager and the
/// preference service.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Raw preference record, legacy or canonical, camel or snake case.
    async fn get_preferences(&self) -> Result<Value>;

    async fn put_preferences(&self, preferences: &UserPreferences) -> Result<()>;

    async fn get_event_preferences(&self) -> Result<Vec<StoredEventPreference>>;

    async fn post_event_preference(&self, update: &EventPreferenceUpdate) -> Result<()>;

    /// Raw VAPID envelope; validated by the caller.
    async fn get_vapid_key(&self) -> Result<Value>;

    async fn post_subscription(&self, request: &SubscriptionRequest) -> Result<()>;

    async fn delete_subscription(&self, request: &UnsubscribeRequest) -> Result<()>;

    async fn send_test_notification(&self, request: &TestNotificationRequest) -> Result<()>;
}
