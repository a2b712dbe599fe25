//! Outbound (Driven) ports for the message filter.
//!
//! These traits define the collaborators the gate needs: the internal broker,
//! the routing legitimacy check and the audit sink. Each collaborator that the
//! gate depends on for liveness also exposes its own [`ServiceState`].
//!
//! [`ServiceState`]: shared_bus::ServiceState

use crate::domain::{BrokerError, OutboundMessage};
use shared_bus::ServiceStateSupport;
use shared_types::{InboundMessage, LegalName, RoutingDirection};
use tokio::sync::oneshot;

/// Connection to the internal broker.
pub trait BrokerConnection: ServiceStateSupport + 'static {
    type Session: BrokerSession;

    /// Open a new session on the current connection.
    fn create_session(&self) -> Result<Self::Session, BrokerError>;

    /// Ask for the connection to be torn down and re-established.
    /// Best effort, returns immediately.
    fn bounce(&self);
}

/// A session on the internal broker.
pub trait BrokerSession: Send + Sync + 'static {
    type Producer: BrokerProducer;

    fn create_producer(&self) -> Result<Self::Producer, BrokerError>;

    /// Close the session. Must tolerate repeated calls.
    fn close(&self);
}

/// Producer bound to a session.
pub trait BrokerProducer: Send + Sync + 'static {
    /// Submit `message` to `address`.
    ///
    /// `Ok` means the broker took the message; the returned receipt resolves
    /// once it has acknowledged it.
    fn send(&self, address: &str, message: OutboundMessage) -> Result<SendReceipt, BrokerError>;

    /// Close the producer. Must tolerate repeated calls.
    fn close(&self);
}

/// Pending broker acknowledgement of one send.
#[derive(Debug)]
pub struct SendReceipt {
    ack: oneshot::Receiver<Result<(), BrokerError>>,
}

impl SendReceipt {
    /// Linked acknowledgement handle and receipt.
    #[must_use]
    pub fn pair() -> (AckHandle, SendReceipt) {
        let (tx, rx) = oneshot::channel();
        (AckHandle { tx }, SendReceipt { ack: rx })
    }

    /// Receipt that is already acknowledged.
    #[must_use]
    pub fn acknowledged_now() -> Self {
        let (handle, receipt) = Self::pair();
        handle.acknowledge();
        receipt
    }

    /// Wait for the acknowledgement.
    ///
    /// # Errors
    ///
    /// A negative acknowledgement, or [`BrokerError::SessionClosed`] if the
    /// handle was dropped without answering.
    pub async fn acknowledged(self) -> Result<(), BrokerError> {
        self.ack.await.unwrap_or(Err(BrokerError::SessionClosed))
    }
}

/// Broker side of a [`SendReceipt`].
#[derive(Debug)]
pub struct AckHandle {
    tx: oneshot::Sender<Result<(), BrokerError>>,
}

impl AckHandle {
    pub fn acknowledge(self) {
        let _ = self.tx.send(Ok(()));
    }

    pub fn fail(self, error: BrokerError) {
        let _ = self.tx.send(Err(error));
    }
}

/// Decides whether a topic is a legitimate destination for a source.
pub trait InboxTopicValidator: ServiceStateSupport + 'static {
    fn validate_receive_topic(&self, topic: &str, source: &LegalName) -> bool;
}

/// Sink for security audit events.
pub trait FirewallAuditService: ServiceStateSupport + 'static {
    fn packet_drop_event(&self, message: &InboundMessage, reason: &str, direction: RoutingDirection);

    fn packet_accepted_event(&self, message: &InboundMessage, direction: RoutingDirection);
}
