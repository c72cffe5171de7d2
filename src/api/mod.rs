//! API Module
//!
//! Local proxy exposing the worker over HTTP.
//!
//! # Endpoints
//! - `GET /sw/health`, `GET /sw/status`
//! - `POST /sw/install`, `POST /sw/activate`
//! - `POST /sw/message`, `POST /sw/push`, `POST /sw/notification-click`
//! - every other request - intercepted fetch

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
