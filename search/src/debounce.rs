use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Runs only the last of a burst of scheduled jobs, once the burst has been
/// quiet for `delay`.
///
/// Scheduling cancels whatever was scheduled before, including a job that
/// has already started: a superseded job never runs to completion. Dropping
/// the debouncer cancels everything it scheduled.
pub struct Debouncer {
    delay: Duration,
    shutdown: CancellationToken,
    pending: Mutex<Option<CancellationToken>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            shutdown: CancellationToken::new(),
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `job` to run after the quiet window, replacing any pending
    /// job. The returned token cancels this job only.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule<F, Fut>(&self, job: F) -> CancellationToken
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = self.shutdown.child_token();
        if let Some(previous) = self.lock().replace(token.clone()) {
            previous.cancel();
        }
        let delay = self.delay;
        let cancelled = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = async {
                    tokio::time::sleep(delay).await;
                    job().await;
                } => {}
            }
        });
        token
    }

    /// Cancel the pending job, if any.
    pub fn cancel(&self) {
        if let Some(token) = self.lock().take() {
            token.cancel();
        }
    }

    /// Cancel the pending job and refuse to run anything scheduled later.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    fn lock(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
