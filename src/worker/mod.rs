//! Offline Worker Module
//!
//! The background context that intercepts client requests, keeps the cache
//! generations consistent across deployments and displays notifications.
//!
//! Events are handled by the pure `handle_event` function; `WorkerDriver`
//! executes the resulting effects against storage, network and host.

pub mod dispatch;
pub mod driver;
pub mod event;
pub mod host;
pub mod lifecycle;
pub mod messages;
pub mod network;
pub mod notification;
pub mod routing;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatch::{handle_event, WorkerContext};
pub use driver::{DispatchOutcome, WorkerDriver};
pub use event::{ClickedNotification, Effect, FetchRequest, WorkerEvent};
pub use host::{ClientWindow, LocalHost, WorkerHost};
pub use lifecycle::LifecycleState;
pub use messages::{Reply, WorkerMessage};
pub use network::{Fetcher, HttpFetcher};
pub use notification::{NotificationData, NotificationDefaults, NotificationOptions};
pub use routing::FetchPlan;
