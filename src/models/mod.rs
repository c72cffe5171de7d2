//! Request and Response models
//!
//! DTOs exchanged with the remote API and the worker proxy surface.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{
    EventPreferenceUpdate, MessageQuery, NotificationClickRequest, SubscriptionRequest,
    TestNotificationRequest, UnsubscribeRequest,
};
pub use responses::{HealthResponse, StatusResponse, StoredEventPreference, VapidKeyEnvelope};
