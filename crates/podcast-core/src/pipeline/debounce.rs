use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::trace;

/// Cancelable quiet-period timer owned by one query stream.
///
/// Scheduling replaces any pending timer. Once a timer fires, its action runs
/// as a separate task, so later schedules never abort work already started.
pub struct Debouncer {
    window: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: Mutex::new(None),
        }
    }

    /// Run `action` after the window elapses without another `schedule` call
    pub async fn schedule<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        // Held across spawn and replace so the stored timer is always the newest one
        let mut pending = self.pending.lock().await;

        let window = self.window;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            tokio::spawn(action);
        });

        if let Some(previous) = pending.replace(timer) {
            trace!("Superseding pending debounce timer");
            previous.abort();
        }
    }

    /// Drop the pending timer, if any
    pub async fn cancel(&self) {
        if let Some(previous) = self.pending.lock().await.take() {
            previous.abort();
        }
    }

    pub async fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .await
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.get_mut().take() {
            handle.abort();
        }
    }
}
