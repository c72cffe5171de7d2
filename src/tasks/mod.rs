//! Background Tasks Module
//!
//! Long-running background tasks:
//! - Out-of-band retry of push subscriptions the server failed to store

pub mod sync;

pub use sync::spawn_subscription_sync_task;
