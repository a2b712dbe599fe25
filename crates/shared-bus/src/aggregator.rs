//! # Liveness Aggregator
//!
//! Folds the statuses of a fixed set of dependencies into one status that is
//! active only while every dependency is active.
//!
//! ## Ordering
//!
//! Each dependency is followed by its own task. Every notification triggers a
//! full recomputation over the *current* values of all dependencies, under a
//! single lock, so concurrent notifications cannot publish a stale result
//! after a fresher one.

use crate::state::{ServiceState, ServiceStateSupport};
use crate::subscription::StatusSubscription;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Logical AND over dependency statuses.
pub struct LivenessAggregator {
    dependencies: Arc<[ServiceState]>,
    state: ServiceState,
    /// Guards recomputation; the flag is `false` once stopped.
    running: Arc<Mutex<bool>>,
    followers: Mutex<Vec<StatusSubscription>>,
}

impl LivenessAggregator {
    /// Create an aggregator over `dependencies`. Nothing is observed until
    /// [`start`](Self::start).
    #[must_use]
    pub fn new(name: impl Into<String>, dependencies: Vec<ServiceState>) -> Self {
        Self {
            dependencies: dependencies.into(),
            state: ServiceState::new(name),
            running: Arc::new(Mutex::new(false)),
            followers: Mutex::new(Vec::new()),
        }
    }

    /// Begin observing. The aggregate is computed immediately, then on
    /// every dependency change. Calling `start` twice is a no-op.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) {
        let mut followers = self.followers.lock();
        if !followers.is_empty() {
            return;
        }
        *self.running.lock() = true;
        recompute(&self.dependencies, &self.state, &self.running);

        for dependency in self.dependencies.iter() {
            let dependencies = Arc::clone(&self.dependencies);
            let state = self.state.clone();
            let running = Arc::clone(&self.running);
            followers.push(dependency.follow(move |_| {
                recompute(&dependencies, &state, &running);
            }));
        }
        debug!(
            aggregate = %self.state.name(),
            dependencies = self.dependencies.len(),
            "Liveness aggregator started"
        );
    }

    /// Release every dependency subscription. No further changes are
    /// published after this returns. Idempotent.
    pub fn stop(&self) {
        *self.running.lock() = false;
        let mut followers = self.followers.lock();
        for follower in followers.iter_mut() {
            follower.unsubscribe();
        }
        followers.clear();
    }

    /// Names of the observed dependencies.
    #[must_use]
    pub fn dependency_names(&self) -> Vec<String> {
        self.dependencies
            .iter()
            .map(|d| d.name().to_string())
            .collect()
    }
}

impl ServiceStateSupport for LivenessAggregator {
    fn service_state(&self) -> &ServiceState {
        &self.state
    }
}

impl Drop for LivenessAggregator {
    fn drop(&mut self) {
        self.stop();
    }
}

fn recompute(dependencies: &[ServiceState], state: &ServiceState, running: &Mutex<bool>) {
    let running = running.lock();
    if !*running {
        return;
    }
    let all_active = dependencies.iter().all(ServiceState::is_active);
    state.set_active(all_active);
}
