//! Cancellable one-shot timer backed by a tokio task.

use std::time::Duration;

use tokio::task::JoinHandle;

/// A single pending deferred callback.
///
/// Arming always cancels the previously armed callback first, so at most one
/// callback is pending per timer. Dropping the timer cancels it.
///
/// Aborting cannot interrupt a callback that is already running; callers
/// that need exactly-once semantics across a re-arm should tag each arming
/// (see the generation check in [`MotionController`](crate::controller::MotionController)).
#[derive(Debug, Default)]
pub struct ResetTimer {
    handle: Option<JoinHandle<()>>,
}

impl ResetTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any pending callback, then schedule `on_expiry` after `after`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn rearm<F>(&mut self, after: Duration, on_expiry: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(after).await;
            on_expiry();
        }));
    }

    /// Cancel the pending callback. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Forget the handle without aborting; used by the callback itself once
    /// it has fired.
    pub fn clear(&mut self) {
        self.handle = None;
    }

    /// Whether a callback is scheduled and has not completed yet.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for ResetTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
