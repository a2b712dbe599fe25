//! # No-op Float Services
//!
//! Stand-ins for the listener and control channel when the float runs without
//! a network stack (combined mode, local runs, tests). Both report active
//! while started.

use crate::ports::{ControlChannelService, ListenerService};
use shared_bus::{ServiceState, ServiceStateSupport};
use std::sync::Arc;
use tracing::debug;

/// Listener that accepts no connections.
#[derive(Debug)]
pub struct NoOpListener {
    state: ServiceState,
}

impl NoOpListener {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ServiceState::new("float-listener"),
        }
    }
}

impl Default for NoOpListener {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceStateSupport for NoOpListener {
    fn service_state(&self) -> &ServiceState {
        &self.state
    }
}

impl ListenerService for NoOpListener {
    fn start(&self) {
        debug!("No-op listener started");
        self.state.set_active(true);
    }

    fn stop(&self) {
        self.state.set_active(false);
    }
}

/// Control channel bound to a listener but exchanging no control traffic.
#[derive(Debug)]
pub struct NoOpControlChannel<L: ListenerService> {
    state: ServiceState,
    listener: Arc<L>,
}

impl<L: ListenerService> NoOpControlChannel<L> {
    #[must_use]
    pub fn new(listener: Arc<L>) -> Self {
        Self {
            state: ServiceState::new("float-control"),
            listener,
        }
    }

    /// Listener this channel runs over.
    #[must_use]
    pub fn listener(&self) -> &Arc<L> {
        &self.listener
    }
}

impl<L: ListenerService> ServiceStateSupport for NoOpControlChannel<L> {
    fn service_state(&self) -> &ServiceState {
        &self.state
    }
}

impl<L: ListenerService> ControlChannelService for NoOpControlChannel<L> {
    fn start(&self) {
        debug!(listener = %self.listener.service_state().name(), "No-op control channel started");
        self.state.set_active(true);
    }

    fn stop(&self) {
        self.state.set_active(false);
    }
}
