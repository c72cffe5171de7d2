//! Scriptable push host for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::push::capability::{Capabilities, HostProfile};
use crate::push::host::{
    PermissionState, PushHost, PushHostError, PushSubscription, SubscriptionKeys,
};
use crate::push::vapid::VapidKey;

const CHROME_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36";

struct FakeHostState {
    profile: HostProfile,
    permission: PermissionState,
    prompt_answer: PermissionState,
    subscription: Option<PushSubscription>,
    failures_left: u32,
    failure: PushHostError,
    fail_queries: bool,
    subscribe_calls: u32,
    issued: u32,
}

/// Fails the first `k` subscribe calls, then issues a fresh subscription.
pub struct FakePushHost {
    state: Mutex<FakeHostState>,
}

impl FakePushHost {
    /// Chrome, every capability present, permission granted.
    pub fn new() -> Self {
        Self::with_profile(HostProfile {
            capabilities: Capabilities::all(),
            user_agent: CHROME_UA.to_string(),
            brave_marker: false,
        })
    }

    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self::with_profile(HostProfile {
            capabilities,
            user_agent: CHROME_UA.to_string(),
            brave_marker: false,
        })
    }

    pub fn with_user_agent(user_agent: &str, brave_marker: bool) -> Self {
        Self::with_profile(HostProfile {
            capabilities: Capabilities::all(),
            user_agent: user_agent.to_string(),
            brave_marker,
        })
    }

    fn with_profile(profile: HostProfile) -> Self {
        Self {
            state: Mutex::new(FakeHostState {
                profile,
                permission: PermissionState::Granted,
                prompt_answer: PermissionState::Denied,
                subscription: None,
                failures_left: 0,
                failure: PushHostError::Network("unreachable".to_string()),
                fail_queries: false,
                subscribe_calls: 0,
                issued: 0,
            }),
        }
    }

    pub fn set_permission(&self, permission: PermissionState) {
        self.state.lock().unwrap().permission = permission;
    }

    pub fn set_prompt_answer(&self, answer: PermissionState) {
        self.state.lock().unwrap().prompt_answer = answer;
    }

    pub fn fail_first(&self, count: u32, error: PushHostError) {
        let mut state = self.state.lock().unwrap();
        state.failures_left = count;
        state.failure = error;
    }

    pub fn fail_queries(&self, fail: bool) {
        self.state.lock().unwrap().fail_queries = fail;
    }

    /// Drops the subscription as if the browser revoked it.
    pub fn revoke(&self) {
        self.state.lock().unwrap().subscription = None;
    }

    pub fn subscribe_calls(&self) -> u32 {
        self.state.lock().unwrap().subscribe_calls
    }

    pub fn subscription(&self) -> Option<PushSubscription> {
        self.state.lock().unwrap().subscription.clone()
    }
}

#[async_trait]
impl PushHost for FakePushHost {
    async fn profile(&self) -> HostProfile {
        self.state.lock().unwrap().profile.clone()
    }

    async fn permission_state(&self) -> Result<PermissionState, PushHostError> {
        Ok(self.state.lock().unwrap().permission)
    }

    async fn request_permission(&self) -> Result<PermissionState, PushHostError> {
        let mut state = self.state.lock().unwrap();
        state.permission = state.prompt_answer;
        Ok(state.permission)
    }

    async fn get_subscription(&self) -> Result<Option<PushSubscription>, PushHostError> {
        let state = self.state.lock().unwrap();
        if state.fail_queries {
            return Err(PushHostError::InvalidState("push manager unavailable".to_string()));
        }
        Ok(state.subscription.clone())
    }

    async fn subscribe(&self, _key: &VapidKey) -> Result<PushSubscription, PushHostError> {
        let mut state = self.state.lock().unwrap();
        state.subscribe_calls += 1;
        if state.failures_left > 0 {
            state.failures_left -= 1;
            return Err(state.failure.clone());
        }
        state.issued += 1;
        let subscription = PushSubscription {
            endpoint: format!("https://push.example.test/send/{}", state.issued),
            keys: SubscriptionKeys {
                p256dh: "BEl62iUYgUivxIkv69yViEuiBIa-Ib9-SkvMeAtA3LFgDzkrxZJjSgSnfckjBJuBkr3qBUYIHBQFLXYp5Nksh8U".to_string(),
                auth: "tBHItJI5svbpez7KI4CCXg".to_string(),
            },
        };
        state.subscription = Some(subscription.clone());
        Ok(subscription)
    }

    async fn unsubscribe(&self, subscription: &PushSubscription) -> Result<bool, PushHostError> {
        let mut state = self.state.lock().unwrap();
        if state.subscription.as_ref() == Some(subscription) {
            state.subscription = None;
            return Ok(true);
        }
        Ok(false)
    }
}
