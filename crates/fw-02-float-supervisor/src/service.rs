//! # Float Supervisor Service
//!
//! Composes the always-present listener with the control channel (float-outer
//! only) and republishes their aggregated liveness as its own.
//!
//! ## Ordering
//!
//! ```text
//! start: listener.start → control.start → follow AND(listener, control)
//! stop:  inactive → control.stop → listener.stop → release subscription
//! ```
//!
//! The control channel runs over the listener, so it starts after it and
//! stops before it.

use crate::error::SupervisorError;
use crate::ports::{ControlChannelService, FloatSupervisor, ListenerService};
use parking_lot::Mutex;
use shared_bus::{LivenessAggregator, ServiceState, ServiceStateSupport, StatusSubscription};
use shared_types::{ConfigError, FirewallConfiguration, FirewallMode};
use std::sync::Arc;
use tracing::{debug, info};

/// Console-facing operator log target.
pub const BASIC_INFO_TARGET: &str = "basic_info";

/// Supervisor for the float side of a split deployment.
pub struct FloatSupervisorService<L, K>
where
    L: ListenerService,
    K: ControlChannelService,
{
    mode: FirewallMode,
    listener: Arc<L>,
    control: Option<Arc<K>>,
    liveness: LivenessAggregator,
    state: ServiceState,
    /// `false` once stopped; guards republishing.
    running: Arc<Mutex<bool>>,
    follower: Mutex<Option<StatusSubscription>>,
    console: Mutex<Option<StatusSubscription>>,
}

impl<L, K> FloatSupervisorService<L, K>
where
    L: ListenerService,
    K: ControlChannelService,
{
    /// Assemble the supervisor.
    ///
    /// `control_factory` is only invoked for [`FirewallMode::FloatOuter`]; it
    /// receives the listener the control channel runs over.
    ///
    /// # Errors
    ///
    /// A float-outer configuration carrying HA settings. Nothing is
    /// constructed or started in that case.
    pub fn new<F>(
        config: &FirewallConfiguration,
        listener: Arc<L>,
        control_factory: F,
    ) -> Result<Self, SupervisorError>
    where
        F: FnOnce(&FirewallConfiguration, Arc<L>) -> Arc<K>,
    {
        let control = if config.firewall_mode == FirewallMode::FloatOuter {
            if config.ha_config.is_some() {
                return Err(ConfigError::FloatWithHaConfig.into());
            }
            Some(control_factory(config, Arc::clone(&listener)))
        } else {
            None
        };

        let mut dependencies = vec![listener.service_state().clone()];
        if let Some(control) = &control {
            dependencies.push(control.service_state().clone());
        }

        Ok(Self {
            mode: config.firewall_mode,
            listener,
            control,
            liveness: LivenessAggregator::new("float-supervisor-dependencies", dependencies),
            state: ServiceState::new("float-supervisor"),
            running: Arc::new(Mutex::new(false)),
            follower: Mutex::new(None),
            console: Mutex::new(None),
        })
    }

    #[must_use]
    pub fn mode(&self) -> FirewallMode {
        self.mode
    }

    #[must_use]
    pub fn listener(&self) -> &Arc<L> {
        &self.listener
    }

    #[must_use]
    pub fn control_channel(&self) -> Option<&Arc<K>> {
        self.control.as_ref()
    }
}

impl<L, K> FloatSupervisor for FloatSupervisorService<L, K>
where
    L: ListenerService,
    K: ControlChannelService,
{
    fn start(&self) {
        let mut follower = self.follower.lock();
        if follower.is_some() {
            return;
        }

        self.console.lock().get_or_insert_with(|| {
            self.state.follow(|active| {
                info!(target: BASIC_INFO_TARGET, "FloatSupervisorService: active = {}", active);
            })
        });

        self.listener.start();
        if let Some(control) = &self.control {
            control.start();
        }

        *self.running.lock() = true;
        self.liveness.start();
        let state = self.state.clone();
        let running = Arc::clone(&self.running);
        *follower = Some(self.liveness.service_state().follow(move |active| {
            let running = running.lock();
            if *running {
                state.set_active(active);
            }
        }));
        info!(
            mode = %self.mode,
            control_channel = self.control.is_some(),
            "Float supervisor started"
        );
    }

    fn stop(&self) {
        let mut follower = self.follower.lock();
        {
            let mut running = self.running.lock();
            *running = false;
            self.state.set_active(false);
        }
        let Some(mut subscription) = follower.take() else {
            debug!("Float supervisor stop requested while not started");
            return;
        };
        if let Some(control) = &self.control {
            control.stop();
        }
        self.listener.stop();
        self.liveness.stop();
        subscription.unsubscribe();
        info!("Float supervisor stopped");
    }
}

impl<L, K> ServiceStateSupport for FloatSupervisorService<L, K>
where
    L: ListenerService,
    K: ControlChannelService,
{
    fn service_state(&self) -> &ServiceState {
        &self.state
    }
}

impl<L, K> Drop for FloatSupervisorService<L, K>
where
    L: ListenerService,
    K: ControlChannelService,
{
    fn drop(&mut self) {
        self.stop();
        if let Some(mut console) = self.console.lock().take() {
            console.unsubscribe();
        }
    }
}
