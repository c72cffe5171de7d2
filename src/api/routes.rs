//! API Routes
//!
//! Configures the Axum router: worker control routes under `/sw/`, everything
//! else intercepted as a fetch.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    activate_handler, fetch_handler, health_handler, install_handler, message_handler,
    notification_click_handler, push_handler, status_handler, AppState,
};

/// Creates the proxy router.
///
/// # Endpoints
/// - `GET /sw/health` - Health check
/// - `GET /sw/status` - Lifecycle state, cache generations and stats
/// - `POST /sw/install` / `POST /sw/activate` - Lifecycle events
/// - `POST /sw/message?reply=bool` - Client message, returns the reply
/// - `POST /sw/push` - Push event, raw body is the payload
/// - `POST /sw/notification-click` - Notification click
/// - anything else - Fetch event against the app origin
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/sw/health", get(health_handler))
        .route("/sw/status", get(status_handler))
        .route("/sw/install", post(install_handler))
        .route("/sw/activate", post(activate_handler))
        .route("/sw/message", post(message_handler))
        .route("/sw/push", post(push_handler))
        .route("/sw/notification-click", post(notification_click_handler))
        .fallback(fetch_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
