//! Error types for the offline cache worker and push subscription lifecycle
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::push::PushHostError;

// == App Error Enum ==
/// Unified error type for the crate.
#[derive(Error, Debug)]
pub enum AppError {
    /// A required host capability is absent
    #[error("Unsupported platform: {0}")]
    Unsupported(String),

    /// The user or platform policy refused notification permission
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Network or host API failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Every subscription attempt failed; carries the last host error
    #[error("Push subscription failed after {attempts} attempt(s): {source}")]
    SubscribeFailed {
        attempts: u32,
        #[source]
        source: PushHostError,
    },

    /// Server payload missing required fields or undecodable
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Preferences rejected before submission
    #[error("Invalid preferences: {0}")]
    InvalidPreferences(String),

    /// Precache manifest could not be fully fetched
    #[error("Install failed: {0}")]
    InstallFailed(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True for failures that a bounded retry may recover from.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::Transport(_) | AppError::SubscribeFailed { .. })
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::MalformedResponse(err.to_string())
        } else {
            AppError::Transport(err.to_string())
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Unsupported(_) => StatusCode::NOT_IMPLEMENTED,
            AppError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AppError::Transport(_) => StatusCode::BAD_GATEWAY,
            AppError::SubscribeFailed { .. } => StatusCode::BAD_GATEWAY,
            AppError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
            AppError::InvalidPreferences(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InstallFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "success": false,
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, AppError>;
