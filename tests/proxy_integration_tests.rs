//! Integration Tests for the Worker Proxy
//!
//! Drives the full router against a stub upstream: lifecycle, routing
//! strategies, messages, push and notification clicks.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use calpush::worker::WorkerHost;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use calpush::{
    api::create_router,
    cache::{CacheStorage, CachedResponse},
    config::Config,
    error::{AppError, Result},
    worker::{FetchRequest, Fetcher, LocalHost, WorkerContext, WorkerDriver},
    AppState,
};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tower::ServiceExt;

const ORIGIN: &str = "https://cal.test";

// == Stub Upstream ==

#[derive(Default)]
struct StubUpstream {
    routes: Mutex<HashMap<String, (u16, String)>>,
    offline: AtomicBool,
    seen: Mutex<Vec<(Method, String)>>,
}

impl StubUpstream {
    fn serve(&self, path: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(format!("{}{}", ORIGIN, path), (status, body.to_string()));
    }

    fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn hits(&self, path: &str) -> usize {
        let url = format!("{}{}", ORIGIN, path);
        self.seen.lock().unwrap().iter().filter(|(_, u)| *u == url).count()
    }

    fn methods(&self) -> Vec<Method> {
        self.seen.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
    }
}

#[async_trait]
impl Fetcher for StubUpstream {
    async fn fetch(&self, request: &FetchRequest) -> Result<CachedResponse> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::Transport("network down".to_string()));
        }
        self.seen
            .lock()
            .unwrap()
            .push((request.method.clone(), request.url.clone()));
        let routes = self.routes.lock().unwrap();
        let (status, body) = routes
            .get(&request.url)
            .cloned()
            .unwrap_or((404, "not found".to_string()));
        Ok(CachedResponse::basic(status, "text/plain", body))
    }
}

// == Helper Functions ==

struct TestApp {
    router: Router,
    upstream: Arc<StubUpstream>,
    host: Arc<LocalHost>,
}

impl TestApp {
    fn new() -> Self {
        let config = Config {
            upstream_origin: ORIGIN.to_string(),
            precache_urls: vec!["/".to_string(), "/icons/icon-192x192.png".to_string()],
            ..Config::default()
        };
        let upstream = Arc::new(StubUpstream::default());
        upstream.serve("/", 200, "<html>shell</html>");
        upstream.serve("/icons/icon-192x192.png", 200, "png");

        let host = Arc::new(LocalHost::new());
        let driver = WorkerDriver::new(
            WorkerContext::from_config(&config).unwrap(),
            Arc::new(RwLock::new(CacheStorage::new(50))),
            upstream.clone(),
            host.clone(),
        );
        let router = create_router(AppState::new(Arc::new(driver)));

        Self {
            router,
            upstream,
            host,
        }
    }

    async fn send(&self, method: &str, uri: &str, body: Body) -> (StatusCode, Vec<u8>) {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(body)
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    async fn get(&self, uri: &str) -> (StatusCode, String) {
        let (status, body) = self.send("GET", uri, Body::empty()).await;
        (status, String::from_utf8(body).unwrap())
    }

    async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let (status, bytes) = self.send("POST", uri, Body::from(body.to_string())).await;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn activate(&self) {
        let (status, _) = self.post_json("/sw/install", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        let (status, json) = self.post_json("/sw/activate", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["state"], "active");
    }
}

// == Lifecycle Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new();
    let (status, body) = app.get("/sw/health").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_install_and_activate() {
    let app = TestApp::new();
    let client = app.host.register_client(&format!("{}/", ORIGIN)).await;

    let (status, json) = app.post_json("/sw/install", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["state"], "waiting-to-activate");

    let (status, json) = app.post_json("/sw/activate", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["state"], "active");
    assert_eq!(json["generations"].as_array().unwrap().len(), 1);
    assert_eq!(json["stats"]["total_entries"], 2);

    let delivered = app.host.delivered().await;
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].0, client.id);
}

#[tokio::test]
async fn test_install_failure_commits_nothing() {
    let app = TestApp::new();
    app.upstream.serve("/icons/icon-192x192.png", 500, "boom");

    let (status, json) = app.post_json("/sw/install", json!({})).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["success"], false);

    let (_, body) = app.get("/sw/status").await;
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["state"], "installing");
    assert_eq!(json["stats"]["total_entries"], 0);

    // Retry once the asset is back
    app.upstream.serve("/icons/icon-192x192.png", 200, "png");
    let (status, _) = app.post_json("/sw/install", json!({})).await;
    assert_eq!(status, StatusCode::OK);
}

// == Routing Tests ==

#[tokio::test]
async fn test_requests_pass_through_before_activation() {
    let app = TestApp::new();
    app.upstream.serve("/app.js", 200, "console.log(1)");

    app.get("/app.js").await;
    app.get("/app.js").await;

    assert_eq!(app.upstream.hits("/app.js"), 2);
}

#[tokio::test]
async fn test_api_is_network_first() {
    let app = TestApp::new();
    app.activate().await;
    app.upstream.serve("/api/events", 200, "fresh");

    let (status, body) = app.get("/api/events").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "fresh");

    // Live data wins while the network answers
    app.upstream.serve("/api/events", 200, "fresher");
    let (_, body) = app.get("/api/events").await;
    assert_eq!(body, "fresher");

    // Never stored by network-first, so offline means the fallback page
    app.upstream.set_offline(true);
    let (status, body) = app.get("/api/events").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("offline"));
}

#[tokio::test]
async fn test_static_assets_are_cache_first() {
    let app = TestApp::new();
    app.activate().await;
    app.upstream.serve("/assets/app.css", 200, "body{}");

    let (status, body) = app.get("/assets/app.css").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "body{}");

    app.upstream.set_offline(true);
    let (status, body) = app.get("/assets/app.css").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "body{}");
    assert_eq!(app.upstream.hits("/assets/app.css"), 1);

    // Shell served from the precache while offline
    let (status, body) = app.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<html>shell</html>");
}

#[tokio::test]
async fn test_uncacheable_responses_not_stored() {
    let app = TestApp::new();
    app.activate().await;

    let (status, _) = app.get("/missing.png").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    app.get("/missing.png").await;

    assert_eq!(app.upstream.hits("/missing.png"), 2);
}

#[tokio::test]
async fn test_non_get_passes_through() {
    let app = TestApp::new();
    app.activate().await;
    app.upstream.serve("/api/users/me/preferences", 200, "{}");

    let (status, _) = app
        .send("PUT", "/api/users/me/preferences", Body::from("{}"))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(app.upstream.methods().contains(&Method::PUT));
}

#[tokio::test]
async fn test_offline_passthrough_is_bad_gateway() {
    let app = TestApp::new();
    app.activate().await;
    app.upstream.set_offline(true);

    let (status, _) = app
        .send("POST", "/api/notifications/test", Body::from("{}"))
        .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

// == Message, Push and Click Tests ==

#[tokio::test]
async fn test_show_notification_message_replies() {
    let app = TestApp::new();

    let (status, json) = app
        .post_json(
            "/sw/message",
            json!({"type": "SHOW_NOTIFICATION", "payload": {"title": "Standup", "body": "in 10 minutes"}}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let shown = app.host.shown().await;
    assert_eq!(shown[0].title, "Standup");
    assert_eq!(shown[0].vibrate, Some(vec![200, 100, 200]));
    assert!(shown[0].icon.is_some());
}

#[tokio::test]
async fn test_unknown_message_reply_is_failure() {
    let app = TestApp::new();

    let (status, json) = app.post_json("/sw/message", json!({"type": "REFRESH"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], false);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_push_always_shows_something() {
    let app = TestApp::new();

    let (status, _) = app.send("POST", "/sw/push", Body::from(vec![0xff, 0xfe])).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (status, _) = app
        .send("POST", "/sw/push", Body::from(r#"{"title": 42}"#))
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let shown = app.host.shown().await;
    assert_eq!(shown.len(), 2);
    assert!(shown.iter().all(|n| !n.title.is_empty()));
    assert_eq!(shown[1].tag.as_deref(), Some("notification-error"));
}

#[tokio::test]
async fn test_notification_click_focuses_existing_window() {
    let app = TestApp::new();
    let client = app.host.register_client(&format!("{}/?event=evt-7", ORIGIN)).await;

    let (status, _) = app
        .post_json(
            "/sw/notification-click",
            json!({"tag": "evt-7", "data": {"eventId": "evt-7"}}),
        )
        .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    let clients = app.host.client_windows().await;
    assert_eq!(clients.len(), 1);
    assert!(clients.iter().find(|c| c.id == client.id).unwrap().focused);
}

#[tokio::test]
async fn test_dismiss_opens_nothing() {
    let app = TestApp::new();

    let (status, _) = app
        .post_json(
            "/sw/notification-click",
            json!({"action": "dismiss", "data": {"url": "/settings"}}),
        )
        .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(app.host.client_windows().await.is_empty());
}
