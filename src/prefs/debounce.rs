//! Cancel-and-reschedule timer for debounced writes.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::debug;

/// Receives the value once the debounce delay elapses.
#[async_trait]
pub trait DebounceSink<T>: Send + Sync {
    async fn deliver(&self, value: T);
}

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Holds at most one pending value and the timer that will deliver it.
///
/// Scheduling again replaces both. Dropping the debouncer abandons a pending
/// value; call `flush_now` first to keep it.
pub struct Debouncer<T> {
    sink: Arc<dyn DebounceSink<T>>,
    pending: Arc<Mutex<Option<T>>>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(sink: Arc<dyn DebounceSink<T>>) -> Self {
        Self {
            sink,
            pending: Arc::new(Mutex::new(None)),
            timer: Mutex::new(None),
        }
    }

    /// Replaces any pending value and restarts the timer.
    pub fn schedule(&self, value: T, delay: Duration) {
        self.abort_timer();
        *lock(&self.pending) = Some(value);

        let sink = Arc::clone(&self.sink);
        let pending = Arc::clone(&self.pending);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let value = lock(&pending).take();
            if let Some(value) = value {
                sink.deliver(value).await;
            }
        });
        *lock(&self.timer) = Some(handle);
    }

    /// Delivers the pending value immediately. Returns whether there was one.
    pub async fn flush_now(&self) -> bool {
        self.abort_timer();
        let value = lock(&self.pending).take();
        match value {
            Some(value) => {
                self.sink.deliver(value).await;
                true
            }
            None => false,
        }
    }

    /// Drops the pending value without delivering it.
    pub fn cancel(&self) -> Option<T> {
        self.abort_timer();
        let value = lock(&self.pending).take();
        if value.is_some() {
            debug!("Debounced write cancelled");
        }
        value
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.pending).is_some()
    }

    fn abort_timer(&self) {
        if let Some(handle) = lock(&self.timer).take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        delivered: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn delivered(&self) -> Vec<String> {
            self.delivered.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DebounceSink<String> for Recorder {
        async fn deliver(&self, value: String) {
            self.delivered.lock().unwrap().push(value);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_last_value_delivered() {
        let recorder = Arc::new(Recorder::default());
        let debouncer: Debouncer<String> = Debouncer::new(recorder.clone());
        let delay = Duration::from_millis(1000);

        debouncer.schedule("m".to_string(), delay);
        tokio::time::sleep(Duration::from_millis(500)).await;
        debouncer.schedule("me@".to_string(), delay);
        tokio::time::sleep(Duration::from_millis(500)).await;
        debouncer.schedule("me@example.com".to_string(), delay);

        assert!(recorder.delivered().is_empty());
        tokio::time::sleep(Duration::from_millis(1001)).await;

        assert_eq!(recorder.delivered(), vec!["me@example.com".to_string()]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_now_skips_the_wait() {
        let recorder = Arc::new(Recorder::default());
        let debouncer: Debouncer<String> = Debouncer::new(recorder.clone());

        debouncer.schedule("me@example.com".to_string(), Duration::from_secs(60));
        assert!(debouncer.flush_now().await);
        assert_eq!(recorder.delivered().len(), 1);

        // Timer was aborted: nothing arrives later
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(recorder.delivered().len(), 1);
        assert!(!debouncer.flush_now().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_returns_pending_value() {
        let recorder = Arc::new(Recorder::default());
        let debouncer: Debouncer<String> = Debouncer::new(recorder.clone());

        debouncer.schedule("draft".to_string(), Duration::from_millis(100));
        assert_eq!(debouncer.cancel(), Some("draft".to_string()));
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(recorder.delivered().is_empty());
        assert_eq!(debouncer.cancel(), None);
    }
}
