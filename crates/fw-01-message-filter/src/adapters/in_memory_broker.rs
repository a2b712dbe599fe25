//! # In-Memory Broker
//!
//! A broker that keeps accepted messages in memory.
//!
//! Used by the development runtime and by tests. Failures can be injected at
//! every step, and acknowledgements can be automatic or held until
//! [`InMemoryBroker::acknowledge_pending`] is called.
//!
//! A bounce drops the connection and brings it back after the reconnect
//! delay, so liveness followers see a fresh down/up edge. Only a bounded
//! window of recent deliveries is retained.

use crate::domain::{BrokerError, OutboundMessage};
use crate::ports::{AckHandle, BrokerConnection, BrokerProducer, BrokerSession, SendReceipt};
use parking_lot::Mutex;
use shared_bus::{ServiceState, ServiceStateSupport};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A message the broker accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredMessage {
    pub address: String,
    pub message: OutboundMessage,
    pub session_id: u64,
}

struct BrokerInner {
    fail_sessions: AtomicBool,
    fail_producers: AtomicBool,
    fail_sends: AtomicBool,
    manual_ack: AtomicBool,
    bounces: AtomicUsize,
    /// Bumped on every explicit connect/disconnect and every bounce. A
    /// pending reconnect only fires if nothing happened since.
    connection_epoch: AtomicU64,
    next_session_id: AtomicU64,
    open_sessions: AtomicUsize,
    delivered_total: AtomicU64,
    delivered: Mutex<VecDeque<DeliveredMessage>>,
    delivered_capacity: usize,
    pending_acks: Mutex<Vec<(u64, AckHandle)>>,
}

impl BrokerInner {
    fn new(delivered_capacity: usize) -> Self {
        Self {
            fail_sessions: AtomicBool::new(false),
            fail_producers: AtomicBool::new(false),
            fail_sends: AtomicBool::new(false),
            manual_ack: AtomicBool::new(false),
            bounces: AtomicUsize::new(0),
            connection_epoch: AtomicU64::new(0),
            next_session_id: AtomicU64::new(0),
            open_sessions: AtomicUsize::new(0),
            delivered_total: AtomicU64::new(0),
            delivered: Mutex::new(VecDeque::with_capacity(delivered_capacity.min(1024))),
            delivered_capacity,
            pending_acks: Mutex::new(Vec::new()),
        }
    }

    fn record_delivery(&self, delivery: DeliveredMessage) {
        self.delivered_total.fetch_add(1, Ordering::Relaxed);
        if self.delivered_capacity == 0 {
            return;
        }
        let mut delivered = self.delivered.lock();
        if delivered.len() == self.delivered_capacity {
            delivered.pop_front();
        }
        delivered.push_back(delivery);
    }
}

/// In-memory broker connection.
pub struct InMemoryBroker {
    state: ServiceState,
    inner: Arc<BrokerInner>,
    reconnect_delay: Duration,
}

impl InMemoryBroker {
    /// Deliveries kept for inspection by default.
    pub const DEFAULT_DELIVERED_CAPACITY: usize = 1024;

    /// Time between a bounce dropping the connection and restoring it.
    pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(100);

    /// A disconnected broker with automatic acknowledgement.
    #[must_use]
    pub fn new() -> Self {
        Self::with_delivered_capacity(Self::DEFAULT_DELIVERED_CAPACITY)
    }

    /// A disconnected broker retaining at most `capacity` recent deliveries.
    #[must_use]
    pub fn with_delivered_capacity(capacity: usize) -> Self {
        Self {
            state: ServiceState::new("broker-connection"),
            inner: Arc::new(BrokerInner::new(capacity)),
            reconnect_delay: Self::DEFAULT_RECONNECT_DELAY,
        }
    }

    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Simulate the connection coming up or going down.
    ///
    /// Cancels any reconnect still pending from an earlier bounce.
    pub fn set_connected(&self, connected: bool) {
        self.inner.connection_epoch.fetch_add(1, Ordering::SeqCst);
        self.state.set_active(connected);
    }

    pub fn fail_session_creation(&self, fail: bool) {
        self.inner.fail_sessions.store(fail, Ordering::SeqCst);
    }

    pub fn fail_producer_creation(&self, fail: bool) {
        self.inner.fail_producers.store(fail, Ordering::SeqCst);
    }

    /// Make every `send` fail synchronously.
    pub fn fail_sends(&self, fail: bool) {
        self.inner.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Hold acknowledgements until released explicitly.
    pub fn set_manual_acknowledge(&self, manual: bool) {
        self.inner.manual_ack.store(manual, Ordering::SeqCst);
    }

    /// Acknowledge every held send. Returns how many were released.
    pub fn acknowledge_pending(&self) -> usize {
        let pending: Vec<_> = self.inner.pending_acks.lock().drain(..).collect();
        let count = pending.len();
        for (_, handle) in pending {
            handle.acknowledge();
        }
        count
    }

    /// Negatively acknowledge every held send.
    pub fn fail_pending(&self, reason: &str) -> usize {
        let pending: Vec<_> = self.inner.pending_acks.lock().drain(..).collect();
        let count = pending.len();
        for (_, handle) in pending {
            handle.fail(BrokerError::SendFailed {
                address: String::new(),
                reason: reason.to_string(),
            });
        }
        count
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.pending_acks.lock().len()
    }

    /// The most recent deliveries, oldest first.
    #[must_use]
    pub fn delivered(&self) -> Vec<DeliveredMessage> {
        self.inner.delivered.lock().iter().cloned().collect()
    }

    /// Remove and return the retained deliveries.
    pub fn take_delivered(&self) -> Vec<DeliveredMessage> {
        self.inner.delivered.lock().drain(..).collect()
    }

    /// Every delivery accepted since creation, including evicted ones.
    #[must_use]
    pub fn delivered_total(&self) -> u64 {
        self.inner.delivered_total.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn bounce_count(&self) -> usize {
        self.inner.bounces.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn sessions_created(&self) -> u64 {
        self.inner.next_session_id.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn open_sessions(&self) -> usize {
        self.inner.open_sessions.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceStateSupport for InMemoryBroker {
    fn service_state(&self) -> &ServiceState {
        &self.state
    }
}

impl BrokerConnection for InMemoryBroker {
    type Session = InMemorySession;

    fn create_session(&self) -> Result<InMemorySession, BrokerError> {
        if !self.state.is_active() {
            return Err(BrokerError::ConnectionUnavailable(
                "not connected".to_string(),
            ));
        }
        if self.inner.fail_sessions.load(Ordering::SeqCst) {
            return Err(BrokerError::SessionCreation("injected failure".to_string()));
        }
        let id = self.inner.next_session_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.open_sessions.fetch_add(1, Ordering::SeqCst);
        debug!(session_id = id, "Session created");
        Ok(InMemorySession {
            id,
            closed: Arc::new(AtomicBool::new(false)),
            broker: Arc::clone(&self.inner),
        })
    }

    fn bounce(&self) {
        let bounces = self.inner.bounces.fetch_add(1, Ordering::SeqCst) + 1;
        info!(bounces, "Broker connection bounce requested");
        if !self.state.is_active() {
            return;
        }

        let epoch = self.inner.connection_epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.set_active(false);

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No runtime to schedule reconnect, restoring broker connection now");
            self.state.set_active(true);
            return;
        };
        let state = self.state.clone();
        let inner = Arc::clone(&self.inner);
        let delay = self.reconnect_delay;
        runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if inner.connection_epoch.load(Ordering::SeqCst) == epoch {
                debug!(bounces, "Broker connection re-established");
                state.set_active(true);
            }
        });
    }
}

/// Session on an [`InMemoryBroker`].
pub struct InMemorySession {
    id: u64,
    closed: Arc<AtomicBool>,
    broker: Arc<BrokerInner>,
}

impl InMemorySession {
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl BrokerSession for InMemorySession {
    type Producer = InMemoryProducer;

    fn create_producer(&self) -> Result<InMemoryProducer, BrokerError> {
        if self.is_closed() {
            return Err(BrokerError::SessionClosed);
        }
        if self.broker.fail_producers.load(Ordering::SeqCst) {
            return Err(BrokerError::ProducerCreation("injected failure".to_string()));
        }
        Ok(InMemoryProducer {
            session_id: self.id,
            session_closed: Arc::clone(&self.closed),
            closed: AtomicBool::new(false),
            broker: Arc::clone(&self.broker),
        })
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.broker.open_sessions.fetch_sub(1, Ordering::SeqCst);
        // Held acknowledgements die with their session.
        self.broker
            .pending_acks
            .lock()
            .retain(|(session_id, _)| *session_id != self.id);
        debug!(session_id = self.id, "Session closed");
    }
}

/// Producer on an [`InMemorySession`].
pub struct InMemoryProducer {
    session_id: u64,
    session_closed: Arc<AtomicBool>,
    closed: AtomicBool,
    broker: Arc<BrokerInner>,
}

impl BrokerProducer for InMemoryProducer {
    fn send(&self, address: &str, message: OutboundMessage) -> Result<SendReceipt, BrokerError> {
        if self.closed.load(Ordering::SeqCst) || self.session_closed.load(Ordering::SeqCst) {
            return Err(BrokerError::SessionClosed);
        }
        if self.broker.fail_sends.load(Ordering::SeqCst) {
            return Err(BrokerError::SendFailed {
                address: address.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        self.broker.record_delivery(DeliveredMessage {
            address: address.to_string(),
            message,
            session_id: self.session_id,
        });
        let (handle, receipt) = SendReceipt::pair();
        if self.broker.manual_ack.load(Ordering::SeqCst) {
            self.broker
                .pending_acks
                .lock()
                .push((self.session_id, handle));
        } else {
            handle.acknowledge();
        }
        Ok(receipt)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
