//! # Service State
//!
//! Observable boolean liveness of a single service.
//!
//! A `ServiceState` is a cheap, clonable handle: every clone observes and
//! publishes the same value. Subscribers always see the latest value first
//! and are then woken on every change.

use crate::subscription::StatusSubscription;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Shared liveness flag of one service.
#[derive(Clone)]
pub struct ServiceState {
    name: Arc<str>,
    sender: Arc<watch::Sender<bool>>,
}

impl ServiceState {
    /// Create an inactive state for the named service.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let (sender, _receiver) = watch::channel(false);
        Self {
            name: Arc::from(name.into()),
            sender: Arc::new(sender),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        *self.sender.borrow()
    }

    /// Publish a new status. Subscribers are only woken on an actual change.
    ///
    /// Returns `true` if the status changed.
    pub fn set_active(&self, active: bool) -> bool {
        let changed = self.sender.send_if_modified(|current| {
            if *current == active {
                return false;
            }
            *current = active;
            true
        });
        if changed {
            info!(service = %self.name, active, "Status change");
        }
        changed
    }

    /// Raw receiver, primed with the current value.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }

    /// Invoke `on_change` with the current status, then on every change,
    /// until the returned subscription is released.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn follow<F>(&self, on_change: F) -> StatusSubscription
    where
        F: FnMut(bool) + Send + 'static,
    {
        StatusSubscription::follow(self.subscribe(), on_change)
    }
}

impl fmt::Debug for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceState")
            .field("name", &self.name)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Implemented by every service that exposes liveness.
pub trait ServiceStateSupport: Send + Sync {
    fn service_state(&self) -> &ServiceState;

    /// Current status of the service.
    fn is_active(&self) -> bool {
        self.service_state().is_active()
    }
}
