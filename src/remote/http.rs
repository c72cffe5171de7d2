//! reqwest implementation of the remote API.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{
    EventPreferenceUpdate, StoredEventPreference, SubscriptionRequest, TestNotificationRequest,
    UnsubscribeRequest,
};
use crate::prefs::UserPreferences;
use crate::remote::{
    RemoteApi, EVENT_PREFERENCES_PATH, PREFERENCES_PATH, PUSH_SUBSCRIPTIONS_PATH,
    TEST_NOTIFICATION_PATH, VAPID_KEY_PATH,
};

/// HTTP client for the calendar backend.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpRemote {
    /// Creates a client rooted at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base_url = Url::parse(&normalized)
            .map_err(|e| AppError::InvalidRequest(format!("invalid API base URL {}: {}", base_url, e)))?;

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            token: None,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api_base_url)
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::Internal(format!("bad endpoint path {}: {}", path, e)))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.endpoint(path)?;
        let builder = self.client.request(method, url);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Sends and maps non-2xx statuses to transport errors.
    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        debug!(url = %response.url(), %status, "Remote API response");

        if !status.is_success() {
            return Err(AppError::Transport(format!(
                "{} returned status {}",
                response.url().path(),
                status
            )));
        }
        Ok(response)
    }

    async fn send_json<B: Serialize + ?Sized>(&self, method: Method, path: &str, body: &B) -> Result<()> {
        let builder = self.request(method, path)?.json(body);
        self.send(builder).await?;
        Ok(())
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        let response = self.send(self.request(Method::GET, path)?).await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| AppError::MalformedResponse(format!("{}: {}", path, e)))
    }
}

#[async_trait]
impl RemoteApi for HttpRemote {
    async fn get_preferences(&self) -> Result<Value> {
        self.get_json(PREFERENCES_PATH).await
    }

    async fn put_preferences(&self, preferences: &UserPreferences) -> Result<()> {
        self.send_json(Method::PUT, PREFERENCES_PATH, preferences).await
    }

    async fn get_event_preferences(&self) -> Result<Vec<StoredEventPreference>> {
        let value = self.get_json(EVENT_PREFERENCES_PATH).await?;
        serde_json::from_value(value)
            .map_err(|e| AppError::MalformedResponse(format!("{}: {}", EVENT_PREFERENCES_PATH, e)))
    }

    async fn post_event_preference(&self, update: &EventPreferenceUpdate) -> Result<()> {
        self.send_json(Method::POST, EVENT_PREFERENCES_PATH, update).await
    }

    async fn get_vapid_key(&self) -> Result<Value> {
        self.get_json(VAPID_KEY_PATH).await
    }

    async fn post_subscription(&self, request: &SubscriptionRequest) -> Result<()> {
        self.send_json(Method::POST, PUSH_SUBSCRIPTIONS_PATH, request).await
    }

    async fn delete_subscription(&self, request: &UnsubscribeRequest) -> Result<()> {
        self.send_json(Method::DELETE, PUSH_SUBSCRIPTIONS_PATH, request).await
    }

    async fn send_test_notification(&self, request: &TestNotificationRequest) -> Result<()> {
        self.send_json(Method::POST, TEST_NOTIFICATION_PATH, request).await
    }
}
