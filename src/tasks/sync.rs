//! Subscription Sync Task
//!
//! Background task that re-posts a push subscription the server failed to
//! store.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::push::SubscriptionManager;

/// Spawns a task that calls `retry_pending_sync` every `interval_secs`.
///
/// Abort the returned handle on shutdown.
pub fn spawn_subscription_sync_task(
    manager: Arc<SubscriptionManager>,
    interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting subscription sync task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            match manager.retry_pending_sync().await {
                Ok(true) => info!("Subscription sync: pending subscription stored"),
                Ok(false) => debug!("Subscription sync: nothing pending"),
                Err(e) => warn!("Subscription sync failed, will retry: {}", e),
            }
        }
    })
}
