//! Push Module
//!
//! Subscription Manager and its seams:
//! - `host`: the browser push API seam and subscription types
//! - `capability`: once-per-session capability and browser probe
//! - `vapid`: server key decoding
//! - `retry`: bounded subscribe retry
//! - `manager`: the lifecycle itself

pub mod capability;
pub mod host;
pub mod manager;
pub mod retry;
pub mod vapid;


#[cfg(test)]
pub(crate) mod testing;

pub use capability::{BrowserFamily, Capabilities, HostProfile, SessionContext};
pub use host::{PermissionState, PushHost, PushHostError, PushSubscription, SubscriptionKeys};
pub use manager::SubscriptionManager;
pub use retry::{RetryExhausted, RetryPolicy};
pub use vapid::{VapidKey, VAPID_KEY_LEN};
