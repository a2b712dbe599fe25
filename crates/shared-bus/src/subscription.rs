//! # Status Subscriptions
//!
//! Handle to a background task following a status channel.
//!
//! When dropped, the subscription is automatically released.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Releasable token for a status follower.
pub struct StatusSubscription {
    handle: Option<JoinHandle<()>>,
}

impl StatusSubscription {
    /// Spawn a follower that calls `on_change` with the value currently in
    /// `receiver`, then again every time the sender publishes.
    ///
    /// A burst of changes may be observed as a single call carrying the
    /// latest value.
    pub fn follow<F>(mut receiver: watch::Receiver<bool>, mut on_change: F) -> Self
    where
        F: FnMut(bool) + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let initial = *receiver.borrow_and_update();
            on_change(initial);
            while receiver.changed().await.is_ok() {
                let active = *receiver.borrow_and_update();
                on_change(active);
            }
            debug!("Status source closed, follower exiting");
        });
        Self {
            handle: Some(handle),
        }
    }

    /// Stop following. Idempotent.
    pub fn unsubscribe(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Whether the follower task is still running.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for StatusSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
