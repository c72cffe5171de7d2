//! Preferences Module
//!
//! Preference Reconciler plus the service that reads and writes through the
//! remote API.

pub mod debounce;
pub mod model;
pub mod reconcile;
pub mod service;


pub use debounce::{DebounceSink, Debouncer};
pub use model::{EventPreference, UserPreferences};
pub use reconcile::{
    derive_event_preferences, fallback_event_preferences, is_valid_email, reconcile_preferences,
};
pub use service::{EmailUpdateSink, PreferenceService};
