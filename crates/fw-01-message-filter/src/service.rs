//! # Message Filter Service
//!
//! Validates inbound peer traffic and forwards it into the internal broker.
//!
//! ## Lifecycle
//!
//! ```text
//!  audit ─┐
//! broker ─┼─→ LivenessAggregator ──true──→ open session + producer ─ok──→ ACTIVE
//! inbox  ─┘                       │                              └─err─→ bounce broker
//!                                 └─false─→ close producer + session ───→ INACTIVE
//! ```
//!
//! The session/producer pair lives in an [`InboundLink`] behind a `RwLock`.
//! Sends hold the read guard for the duration of the submission; teardown and
//! replacement take the write guard. A link is never mutated, only replaced,
//! and each replacement carries a new generation number.
//!
//! ## Dispositions
//!
//! | Situation | Audit | Disposition |
//! |-----------|-------|-------------|
//! | Gate inactive | drop, "dependencies down" | redeliver |
//! | Validation failure | drop, failure reason | consume |
//! | Submission failure | none | redeliver |
//! | Broker acknowledged | accepted | forwarded |
//! | Acknowledgement lost or negative | none | redeliver |

use crate::domain::{
    BrokerError, MessageValidator, OutboundMessage, DEPENDENCIES_DOWN_REASON,
    VALIDATION_FAILED_PREFIX,
};
use crate::metrics;
use crate::ports::{
    BrokerConnection, BrokerProducer, BrokerSession, FirewallAuditService, IncomingMessageFilter,
    InboxTopicValidator, SendReceipt,
};
use parking_lot::{Mutex, RwLock};
use shared_bus::{
    LivenessAggregator, ServiceState, ServiceStateSupport, StatusSubscription,
    TimeBoundedDedupCache,
};
use shared_types::{FirewallConfiguration, InboundMessage, RoutingDirection};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, trace, warn};

/// Session and producer opened together and closed together.
struct InboundLink<S: BrokerSession> {
    session: S,
    producer: S::Producer,
    generation: u64,
}

impl<S: BrokerSession> InboundLink<S> {
    fn close(&self) {
        self.producer.close();
        self.session.close();
        debug!(generation = self.generation, "Inbound link closed");
    }
}

/// Snapshot of gate counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub forwarded: u64,
    pub dropped_inactive: u64,
    pub dropped_invalid: u64,
    pub forward_failures: u64,
    /// Failures logged at error level.
    pub failures_logged: u64,
    /// Repeat failures demoted to trace level.
    pub failures_suppressed: u64,
    pub links_opened: u64,
}

#[derive(Default)]
struct Counters {
    forwarded: AtomicU64,
    dropped_inactive: AtomicU64,
    dropped_invalid: AtomicU64,
    forward_failures: AtomicU64,
    failures_logged: AtomicU64,
    failures_suppressed: AtomicU64,
}

struct GateCore<C, R, A>
where
    C: BrokerConnection,
    R: InboxTopicValidator,
    A: FirewallAuditService,
{
    connection: Arc<C>,
    topics: Arc<R>,
    audit: Arc<A>,
    validator: MessageValidator,
    failure_log: TimeBoundedDedupCache,
    link: RwLock<Option<InboundLink<C::Session>>>,
    /// Only changed while holding the `link` write guard.
    running: AtomicBool,
    generation: AtomicU64,
    state: ServiceState,
    counters: Counters,
}

/// The inbound message filter gate.
pub struct MessageFilterService<C, R, A>
where
    C: BrokerConnection,
    R: InboxTopicValidator,
    A: FirewallAuditService,
{
    core: Arc<GateCore<C, R, A>>,
    liveness: LivenessAggregator,
    subscription: Mutex<Option<StatusSubscription>>,
}

impl<C, R, A> MessageFilterService<C, R, A>
where
    C: BrokerConnection,
    R: InboxTopicValidator,
    A: FirewallAuditService,
{
    /// Create an inactive gate. Liveness is followed once [`start`] is called.
    ///
    /// [`start`]: IncomingMessageFilter::start
    pub fn new(
        config: &FirewallConfiguration,
        connection: Arc<C>,
        topics: Arc<R>,
        audit: Arc<A>,
    ) -> Self {
        let liveness = LivenessAggregator::new(
            "message-filter-dependencies",
            vec![
                audit.service_state().clone(),
                connection.service_state().clone(),
                topics.service_state().clone(),
            ],
        );
        let core = GateCore {
            connection,
            topics,
            audit,
            validator: MessageValidator::new(config.whitelisted_headers.clone()),
            failure_log: TimeBoundedDedupCache::new(
                config.filter_cache.max_entries,
                config.filter_cache.expiry(),
            ),
            link: RwLock::new(None),
            running: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            state: ServiceState::new("message-filter"),
            counters: Counters::default(),
        };
        Self {
            core: Arc::new(core),
            liveness,
            subscription: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn stats(&self) -> FilterStats {
        let c = &self.core.counters;
        FilterStats {
            forwarded: c.forwarded.load(Ordering::Relaxed),
            dropped_inactive: c.dropped_inactive.load(Ordering::Relaxed),
            dropped_invalid: c.dropped_invalid.load(Ordering::Relaxed),
            forward_failures: c.forward_failures.load(Ordering::Relaxed),
            failures_logged: c.failures_logged.load(Ordering::Relaxed),
            failures_suppressed: c.failures_suppressed.load(Ordering::Relaxed),
            links_opened: self.core.generation.load(Ordering::Relaxed),
        }
    }

    /// Generation of the open link, if any.
    #[must_use]
    pub fn link_generation(&self) -> Option<u64> {
        self.core.link.read().as_ref().map(|l| l.generation)
    }

    /// Aggregated status of the gate's dependencies.
    #[must_use]
    pub fn dependencies_active(&self) -> bool {
        self.liveness.is_active()
    }
}

impl<C, R, A> IncomingMessageFilter for MessageFilterService<C, R, A>
where
    C: BrokerConnection,
    R: InboxTopicValidator,
    A: FirewallAuditService,
{
    fn start(&self) {
        let mut subscription = self.subscription.lock();
        if subscription.is_some() {
            return;
        }
        {
            let _link = self.core.link.write();
            self.core.running.store(true, Ordering::SeqCst);
        }
        self.liveness.start();
        let core = Arc::clone(&self.core);
        *subscription = Some(
            self.liveness
                .service_state()
                .follow(move |active| core.on_dependencies_changed(active)),
        );
        info!(
            dependencies = ?self.liveness.dependency_names(),
            "Message filter started"
        );
    }

    fn stop(&self) {
        let mut subscription = self.subscription.lock();
        self.core.shutdown();
        self.liveness.stop();
        if let Some(mut follower) = subscription.take() {
            follower.unsubscribe();
            info!("Message filter stopped");
        }
    }

    fn send_message_to_local_broker(&self, message: InboundMessage) {
        self.core.handle_inbound(message);
    }
}

impl<C, R, A> ServiceStateSupport for MessageFilterService<C, R, A>
where
    C: BrokerConnection,
    R: InboxTopicValidator,
    A: FirewallAuditService,
{
    fn service_state(&self) -> &ServiceState {
        &self.core.state
    }
}

impl<C, R, A> Drop for MessageFilterService<C, R, A>
where
    C: BrokerConnection,
    R: InboxTopicValidator,
    A: FirewallAuditService,
{
    fn drop(&mut self) {
        self.stop();
    }
}

impl<C, R, A> GateCore<C, R, A>
where
    C: BrokerConnection,
    R: InboxTopicValidator,
    A: FirewallAuditService,
{
    fn set_active(&self, active: bool) {
        self.state.set_active(active);
        metrics::set_gate_active(active);
    }

    fn on_dependencies_changed(&self, active: bool) {
        let mut link = self.link.write();
        if !self.running.load(Ordering::SeqCst) {
            return;
        }
        if let Some(old) = link.take() {
            old.close();
        }
        if !active {
            self.set_active(false);
            return;
        }
        match self.open_link() {
            Ok(opened) => {
                info!(generation = opened.generation, "Inbound link opened");
                *link = Some(opened);
                self.set_active(true);
            }
            Err(e) => {
                self.set_active(false);
                drop(link);
                warn!(error = %e, "Problems creating producer. Will bounce Artemis connection.");
                self.connection.bounce();
            }
        }
    }

    fn open_link(&self) -> Result<InboundLink<C::Session>, BrokerError> {
        let session = self.connection.create_session()?;
        let producer = match session.create_producer() {
            Ok(producer) => producer,
            Err(e) => {
                session.close();
                return Err(e);
            }
        };
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(InboundLink {
            session,
            producer,
            generation,
        })
    }

    fn shutdown(&self) {
        let mut link = self.link.write();
        self.running.store(false, Ordering::SeqCst);
        if let Some(old) = link.take() {
            old.close();
        }
        self.set_active(false);
    }

    fn handle_inbound(self: &Arc<Self>, message: InboundMessage) {
        if !self.state.is_active() {
            self.audit
                .packet_drop_event(&message, DEPENDENCIES_DOWN_REASON, RoutingDirection::Inbound);
            self.counters.dropped_inactive.fetch_add(1, Ordering::Relaxed);
            metrics::record_dropped("dependencies_down");
            message.reject();
            return;
        }

        if let Err(e) = self.validator.validate(&message, |topic, source| {
            self.topics.validate_receive_topic(topic, source)
        }) {
            let reason = format!("{VALIDATION_FAILED_PREFIX}{e}");
            self.audit
                .packet_drop_event(&message, &reason, RoutingDirection::Inbound);
            self.counters.dropped_invalid.fetch_add(1, Ordering::Relaxed);
            metrics::record_dropped(e.kind().label());
            message.consume();
            return;
        }

        let msg_id = message.idempotency_token();
        // Nothing may reach the broker unless its acknowledgement can be awaited.
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            error!(msg_id = ?msg_id, "No runtime to await broker acknowledgement");
            message.reject();
            return;
        };
        match self.submit(&message, msg_id.as_deref()) {
            Ok(receipt) => {
                let core = Arc::clone(self);
                runtime.spawn(async move {
                    core.await_acknowledgement(message, receipt, msg_id).await;
                });
            }
            Err(e) => {
                self.report_forward_failure(msg_id.as_deref(), &e);
                message.reject();
            }
        }
    }

    fn submit(
        &self,
        message: &InboundMessage,
        msg_id: Option<&str>,
    ) -> Result<SendReceipt, BrokerError> {
        let guard = self.link.read();
        let link = guard.as_ref().ok_or(BrokerError::NoSession)?;
        let outbound = OutboundMessage::from_inbound(message, self.validator.whitelist());

        debug!(msg_id = ?msg_id, generation = link.generation, "Sending message");
        let started = Instant::now();
        let receipt = link.producer.send(message.topic(), outbound)?;
        let elapsed = started.elapsed();
        metrics::observe_submit_seconds(elapsed.as_secs_f64());
        debug!(
            msg_id = ?msg_id,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "Sent message"
        );
        Ok(receipt)
    }

    async fn await_acknowledgement(
        &self,
        message: InboundMessage,
        receipt: SendReceipt,
        msg_id: Option<String>,
    ) {
        match receipt.acknowledged().await {
            Ok(()) => {
                self.audit
                    .packet_accepted_event(&message, RoutingDirection::Inbound);
                self.counters.forwarded.fetch_add(1, Ordering::Relaxed);
                metrics::record_accepted();
                message.forwarded();
            }
            Err(e) => {
                self.report_forward_failure(msg_id.as_deref(), &e);
                message.reject();
            }
        }
    }

    /// Log a forwarding failure at error level the first time its token is
    /// seen within the cache window, at trace level afterwards. Failures
    /// without a token are always logged at error level.
    fn report_forward_failure(&self, msg_id: Option<&str>, error: &BrokerError) {
        self.counters.forward_failures.fetch_add(1, Ordering::Relaxed);
        let previous = msg_id.and_then(|id| self.failure_log.put_if_absent(id));
        let first_occurrence = previous.is_none();
        if first_occurrence {
            self.counters.failures_logged.fetch_add(1, Ordering::Relaxed);
            error!(
                msg_id = ?msg_id,
                error = %error,
                "Error trying to forward message with id: [{}]",
                msg_id.unwrap_or("null")
            );
        } else {
            self.counters
                .failures_suppressed
                .fetch_add(1, Ordering::Relaxed);
            trace!(
                msg_id = ?msg_id,
                error = %error,
                "Error trying to forward message with id: [{}]",
                msg_id.unwrap_or("null")
            );
        }
        metrics::record_forward_failure(first_occurrence);
    }
}
