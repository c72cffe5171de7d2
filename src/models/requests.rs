//! Request DTOs
//!
//! Bodies sent to the remote API and accepted by the worker proxy.

use serde::{Deserialize, Serialize};

use crate::push::SubscriptionKeys;
use crate::worker::NotificationData;

/// Body for `POST /api/users/me/push-subscriptions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
    pub email: String,
}

/// Body for `DELETE /api/users/me/push-subscriptions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsubscribeRequest {
    pub endpoint: String,
}

/// Body for `POST /api/notifications/test`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestNotificationRequest {
    pub user_id: String,
}

/// Body for `POST /api/users/me/event-preferences`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPreferenceUpdate {
    pub event_type: String,
    pub is_enabled: bool,
}

/// Body for `POST /sw/notification-click`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationClickRequest {
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub data: NotificationData,
    #[serde(default)]
    pub action: Option<String>,
}

/// Query for `POST /sw/message`
#[derive(Debug, Clone, Deserialize)]
pub struct MessageQuery {
    /// Whether the sender supplied a reply channel
    #[serde(default = "default_reply")]
    pub reply: bool,
}

fn default_reply() -> bool {
    true
}

impl Default for MessageQuery {
    fn default() -> Self {
        Self { reply: true }
    }
}

impl EventPreferenceUpdate {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.event_type.trim().is_empty() {
            return Some("Event type cannot be empty".to_string());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_request_shape() {
        let req = SubscriptionRequest {
            endpoint: "https://push.example/abc".to_string(),
            keys: SubscriptionKeys {
                p256dh: "BPk".to_string(),
                auth: "c2Vj".to_string(),
            },
            email: "ana@example.com".to_string(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["keys"]["p256dh"], "BPk");
        assert_eq!(json["email"], "ana@example.com");
    }

    #[test]
    fn test_camel_case_bodies() {
        let json = serde_json::to_value(TestNotificationRequest { user_id: "u1".into() }).unwrap();
        assert_eq!(json, serde_json::json!({"userId": "u1"}));

        let json = serde_json::to_value(EventPreferenceUpdate {
            event_type: "Standup".into(),
            is_enabled: false,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"eventType": "Standup", "isEnabled": false}));
    }

    #[test]
    fn test_validate_event_type() {
        let update = EventPreferenceUpdate {
            event_type: "  ".into(),
            is_enabled: true,
        };
        assert!(update.validate().is_some());
    }

    #[test]
    fn test_click_request_defaults() {
        let req: NotificationClickRequest = serde_json::from_str("{}").unwrap();
        assert!(req.tag.is_none());
        assert!(req.data.url.is_none());

        let query: MessageQuery = serde_json::from_str("{}").unwrap();
        assert!(query.reply);
    }
}
