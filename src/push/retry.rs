//! Bounded retry for host subscription attempts.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::config::Config;
use crate::push::capability::SessionContext;
use crate::push::host::PushHostError;

/// Fixed attempt count with a fixed delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

/// Result of an exhausted loop: how many attempts ran and the last cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryExhausted {
    pub attempts: u32,
    pub last_error: PushHostError,
}

impl RetryPolicy {
    /// At least one attempt is always made.
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    /// Picks the flaky-browser budget for Brave and Edge.
    pub fn for_session(config: &Config, session: &SessionContext) -> Self {
        if session.uses_flaky_retry(config) {
            Self::new(
                config.flaky_subscribe_attempts,
                Duration::from_millis(config.flaky_subscribe_delay_ms),
            )
        } else {
            Self::new(
                config.subscribe_attempts,
                Duration::from_millis(config.subscribe_delay_ms),
            )
        }
    }

    /// Runs `op` until it succeeds, fails with a non-transient error, or the
    /// attempt budget is spent. `op` receives the 1-based attempt index.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, RetryExhausted>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, PushHostError>>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    warn!(attempt, max = self.attempts, error = %err, "Push subscribe attempt failed");
                    if !err.is_transient() || attempt >= self.attempts {
                        return Err(RetryExhausted {
                            attempts: attempt,
                            last_error: err,
                        });
                    }
                }
            }
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            attempt += 1;
        }
    }
}
