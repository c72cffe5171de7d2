//! API Handlers
//!
//! The proxy stands in for the background execution context: control routes
//! under `/sw/` deliver lifecycle, message, push and click events, and every
//! other request is delivered as a fetch event.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{Query, Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::debug;

use crate::cache::{CachedResponse, MAX_BODY_SIZE};
use crate::error::{AppError, Result};
use crate::models::{HealthResponse, MessageQuery, NotificationClickRequest, StatusResponse};
use crate::worker::network::is_hop_by_hop;
use crate::worker::{ClickedNotification, FetchRequest, WorkerDriver, WorkerEvent};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub worker: Arc<WorkerDriver>,
}

impl AppState {
    pub fn new(worker: Arc<WorkerDriver>) -> Self {
        Self { worker }
    }

    async fn status(&self) -> StatusResponse {
        let state = self.worker.state().await;
        let storage = self.worker.storage();
        let storage = storage.read().await;
        StatusResponse::new(
            state,
            self.worker.context().cache_version.clone(),
            storage.generation_names(),
            storage.stats(),
        )
    }
}

impl IntoResponse for CachedResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::BAD_GATEWAY);
        let mut response = (status, Body::from(self.body)).into_response();
        let headers = response.headers_mut();
        for (name, value) in self.headers.iter().filter(|(n, _)| !is_hop_by_hop(n)) {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                headers.append(name, value);
            }
        }
        response
    }
}

/// Handler for GET /sw/health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /sw/status
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(state.status().await)
}

/// Handler for POST /sw/install
///
/// A failed install leaves the worker installing; calling again retries.
pub async fn install_handler(State(state): State<AppState>) -> Result<Json<StatusResponse>> {
    state.worker.dispatch(WorkerEvent::Install).await?;
    Ok(Json(state.status().await))
}

/// Handler for POST /sw/activate
pub async fn activate_handler(State(state): State<AppState>) -> Result<Json<StatusResponse>> {
    state.worker.dispatch(WorkerEvent::Activate).await?;
    Ok(Json(state.status().await))
}

/// Handler for POST /sw/message
///
/// Returns the reply when the sender asked for one, 202 otherwise.
pub async fn message_handler(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    Json(payload): Json<Value>,
) -> Result<Response> {
    let outcome = state
        .worker
        .dispatch(WorkerEvent::Message {
            payload,
            wants_reply: query.reply,
        })
        .await?;

    Ok(match outcome.reply {
        Some(reply) => Json(reply).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    })
}

/// Handler for POST /sw/push
///
/// The raw body is the push payload; an empty body is a push without data.
pub async fn push_handler(State(state): State<AppState>, body: Bytes) -> Result<StatusCode> {
    let data = (!body.is_empty()).then(|| body.to_vec());
    state.worker.dispatch(WorkerEvent::Push(data)).await?;
    Ok(StatusCode::ACCEPTED)
}

/// Handler for POST /sw/notification-click
pub async fn notification_click_handler(
    State(state): State<AppState>,
    Json(req): Json<NotificationClickRequest>,
) -> Result<StatusCode> {
    let clicked = ClickedNotification {
        tag: req.tag,
        data: req.data,
        action: req.action,
    };
    state.worker.dispatch(WorkerEvent::NotificationClick(clicked)).await?;
    Ok(StatusCode::ACCEPTED)
}

/// Fallback: any other request is an intercepted fetch against the app origin.
pub async fn fetch_handler(State(state): State<AppState>, request: Request) -> Result<Response> {
    let (parts, body) = request.into_parts();
    // Path and query only; the origin is always the app origin
    let mut url = state.worker.context().app_origin.clone();
    url.set_path(parts.uri.path());
    url.set_query(parts.uri.query());

    let headers = parts
        .headers
        .iter()
        .filter(|(name, _)| !is_hop_by_hop(name.as_str()))
        .filter_map(|(name, value)| {
            value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let body = axum::body::to_bytes(body, MAX_BODY_SIZE)
        .await
        .map_err(|e| AppError::InvalidRequest(format!("request body: {}", e)))?;

    let request = FetchRequest {
        method: parts.method,
        url: url.to_string(),
        headers,
        body: body.to_vec(),
    };
    debug!(method = %request.method, url = %request.url, "Intercepted fetch");

    let outcome = state.worker.dispatch(WorkerEvent::Fetch(request)).await?;
    outcome
        .response
        .map(IntoResponse::into_response)
        .ok_or_else(|| AppError::Internal("fetch produced no response".to_string()))
}
