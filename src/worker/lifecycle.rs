//! Worker lifecycle states.

use serde::Serialize;

/// Lifecycle of one worker process.
///
/// `Installing -> WaitingToActivate` only after the whole shell manifest is stored;
/// `WaitingToActivate -> Active` after stale generations are deleted and clients claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifecycleState {
    Installing,
    WaitingToActivate,
    Active,
}

impl LifecycleState {
    /// Requests are only intercepted once the worker controls its clients.
    pub fn can_intercept_fetch(&self) -> bool {
        matches!(self, LifecycleState::Active)
    }

    pub fn can_install(&self) -> bool {
        matches!(self, LifecycleState::Installing)
    }

    pub fn can_activate(&self) -> bool {
        matches!(self, LifecycleState::WaitingToActivate)
    }
}

impl Default for LifecycleState {
    fn default() -> Self {
        LifecycleState::Installing
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Installing => write!(f, "installing"),
            LifecycleState::WaitingToActivate => write!(f, "waiting-to-activate"),
            LifecycleState::Active => write!(f, "active"),
        }
    }
}
