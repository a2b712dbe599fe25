//! # Mode Services
//!
//! Concrete service graphs for each firewall mode, wired with the in-memory
//! development adapters.
//!
//! | Mode | Owns |
//! |------|------|
//! | `bridge-inner` | broker connection, inbox registry, audit, message filter gate |
//! | `float-outer` | float supervisor (listener + control channel) |
//! | `combined` | everything `bridge-inner` owns, plus a float supervisor without control channel |

use std::sync::Arc;

use async_trait::async_trait;
use fw_01_message_filter::{
    InMemoryBroker, InboxRegistry, IncomingMessageFilter, MessageFilterService,
    TracingAuditService,
};
use fw_02_float_supervisor::{
    FloatSupervisor, FloatSupervisorService, NoOpControlChannel, NoOpListener,
};
use parking_lot::Mutex;
use shared_bus::{LivenessAggregator, ServiceState, ServiceStateSupport, StatusSubscription};
use shared_types::{FirewallMode, LegalName};
use tracing::info;

use crate::container::config::RuntimeConfig;
use crate::registry::{FirewallService, ServiceError};

pub type DevMessageFilter = MessageFilterService<InMemoryBroker, InboxRegistry, TracingAuditService>;
pub type DevFloatSupervisor = FloatSupervisorService<NoOpListener, NoOpControlChannel<NoOpListener>>;

fn float_supervisor(config: &RuntimeConfig) -> Result<DevFloatSupervisor, ServiceError> {
    Ok(FloatSupervisorService::new(
        &config.firewall,
        Arc::new(NoOpListener::new()),
        |_, listener| Arc::new(NoOpControlChannel::new(listener)),
    )?)
}

/// Bridge side: the message filter gate and its dependencies.
pub struct BridgeInnerService {
    broker: Arc<InMemoryBroker>,
    inboxes: Arc<InboxRegistry>,
    audit: Arc<TracingAuditService>,
    gate: DevMessageFilter,
}

impl BridgeInnerService {
    /// Build the gate and register the configured inboxes.
    ///
    /// # Errors
    ///
    /// An inbox owner that is not a valid legal name.
    pub fn new(config: &RuntimeConfig) -> Result<Self, ServiceError> {
        let broker = Arc::new(InMemoryBroker::new());
        let inboxes = Arc::new(InboxRegistry::new());
        let audit = Arc::new(TracingAuditService::new());

        for binding in &config.inboxes {
            let owner =
                LegalName::parse(&binding.owner).map_err(|source| ServiceError::InboxOwner {
                    owner: binding.owner.clone(),
                    source,
                })?;
            inboxes.register(&owner, binding.inbox.clone());
        }

        let gate = MessageFilterService::new(
            &config.firewall,
            Arc::clone(&broker),
            Arc::clone(&inboxes),
            Arc::clone(&audit),
        );
        Ok(Self {
            broker,
            inboxes,
            audit,
            gate,
        })
    }

    #[must_use]
    pub fn gate(&self) -> &DevMessageFilter {
        &self.gate
    }

    #[must_use]
    pub fn broker(&self) -> &Arc<InMemoryBroker> {
        &self.broker
    }

    #[must_use]
    pub fn inboxes(&self) -> &Arc<InboxRegistry> {
        &self.inboxes
    }

    #[must_use]
    pub fn audit(&self) -> &Arc<TracingAuditService> {
        &self.audit
    }

    fn start_all(&self) {
        self.audit.start();
        self.inboxes.start();
        self.broker.set_connected(true);
        self.gate.start();
    }

    fn stop_all(&self) {
        self.gate.stop();
        self.broker.set_connected(false);
        self.inboxes.stop();
        self.audit.stop();
    }
}

#[async_trait]
impl FirewallService for BridgeInnerService {
    fn name(&self) -> &'static str {
        FirewallMode::BridgeInner.name()
    }

    async fn start(&self) -> Result<(), ServiceError> {
        self.start_all();
        info!("Bridge side started");
        Ok(())
    }

    async fn stop(&self) {
        self.stop_all();
        info!("Bridge side stopped");
    }

    fn is_active(&self) -> bool {
        self.gate.is_active()
    }

    fn message_filter(&self) -> Option<&dyn IncomingMessageFilter> {
        Some(&self.gate)
    }
}

/// Float side of a split deployment.
pub struct FloatOuterService {
    supervisor: DevFloatSupervisor,
}

impl FloatOuterService {
    /// # Errors
    ///
    /// A float configuration carrying HA settings.
    pub fn new(config: &RuntimeConfig) -> Result<Self, ServiceError> {
        Ok(Self {
            supervisor: float_supervisor(config)?,
        })
    }

    #[must_use]
    pub fn supervisor(&self) -> &DevFloatSupervisor {
        &self.supervisor
    }
}

#[async_trait]
impl FirewallService for FloatOuterService {
    fn name(&self) -> &'static str {
        FirewallMode::FloatOuter.name()
    }

    async fn start(&self) -> Result<(), ServiceError> {
        self.supervisor.start();
        Ok(())
    }

    async fn stop(&self) {
        self.supervisor.stop();
    }

    fn is_active(&self) -> bool {
        self.supervisor.is_active()
    }
}

/// Both halves in one process. Active while both are.
///
/// The AND of the two halves is mirrored into a state owned by this service,
/// so `stop` can publish inactive without touching the aggregator.
pub struct CombinedService {
    bridge: BridgeInnerService,
    float: DevFloatSupervisor,
    liveness: LivenessAggregator,
    state: ServiceState,
    running: Arc<Mutex<bool>>,
    follower: Mutex<Option<StatusSubscription>>,
}

impl CombinedService {
    /// # Errors
    ///
    /// See [`BridgeInnerService::new`].
    pub fn new(config: &RuntimeConfig) -> Result<Self, ServiceError> {
        let bridge = BridgeInnerService::new(config)?;
        let float = float_supervisor(config)?;
        let liveness = LivenessAggregator::new(
            "combined-dependencies",
            vec![
                bridge.gate.service_state().clone(),
                float.service_state().clone(),
            ],
        );
        Ok(Self {
            bridge,
            float,
            liveness,
            state: ServiceState::new("combined"),
            running: Arc::new(Mutex::new(false)),
            follower: Mutex::new(None),
        })
    }

    #[must_use]
    pub fn bridge(&self) -> &BridgeInnerService {
        &self.bridge
    }

    #[must_use]
    pub fn float(&self) -> &DevFloatSupervisor {
        &self.float
    }
}

#[async_trait]
impl FirewallService for CombinedService {
    fn name(&self) -> &'static str {
        FirewallMode::Combined.name()
    }

    async fn start(&self) -> Result<(), ServiceError> {
        let mut follower = self.follower.lock();
        if follower.is_some() {
            return Ok(());
        }
        self.bridge.start_all();
        self.float.start();

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
        info!("Combined firewall started");
        Ok(())
    }

    async fn stop(&self) {
        let mut follower = self.follower.lock();
        {
            let mut running = self.running.lock();
            *running = false;
            self.state.set_active(false);
        }
        let Some(mut subscription) = follower.take() else {
            return;
        };
        subscription.unsubscribe();
        self.liveness.stop();
        self.float.stop();
        self.bridge.stop_all();
        info!("Combined firewall stopped");
    }

    fn is_active(&self) -> bool {
        self.state.is_active()
    }

    fn message_filter(&self) -> Option<&dyn IncomingMessageFilter> {
        Some(&self.bridge.gate)
    }
}
