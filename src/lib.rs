//! Calpush - offline cache worker and push subscription lifecycle for a
//! calendar client
//!
//! Serves the application shell from a versioned cache, manages one durable
//! push subscription per browser profile, and reconciles notification
//! preferences from whatever the server stores.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod prefs;
pub mod push;
pub mod remote;
pub mod tasks;
pub mod worker;

pub use api::AppState;
pub use config::Config;
pub use error::{AppError, Result};
pub use tasks::spawn_subscription_sync_task;
