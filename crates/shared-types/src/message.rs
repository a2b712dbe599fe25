//! # Inbound Messages
//!
//! A message received from a remote peer, owned by the transport until the
//! firewall disposes of it.
//!
//! ## Disposition Contract
//!
//! Every `InboundMessage` ends with exactly one [`Disposition`]. The
//! disposition methods consume the message, so a second disposition does not
//! compile. A message dropped without a disposition (early return, panic)
//! reports [`Disposition::Redeliver`] from its `Drop` impl.
//!
//! ```text
//! transport ──(InboundMessage, DispositionReceiver)──→ gate
//!     ↑                                                  │
//!     └──────────── Disposition (exactly once) ──────────┘
//! ```

use crate::entities::{Headers, DUPLICATE_ID_HEADER};
use tokio::sync::oneshot;
use tracing::warn;

/// Terminal outcome of an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disposition {
    /// Consumed at the source and discarded. Never redelivered.
    Dropped,
    /// Accepted by the internal broker; ownership released to it.
    Forwarded,
    /// Negatively acknowledged; the source should redeliver later.
    Redeliver,
}

impl Disposition {
    /// Whether the source may forget the message.
    #[must_use]
    pub fn is_consumed(&self) -> bool {
        !matches!(self, Self::Redeliver)
    }
}

/// Transport side of the disposition channel.
pub type DispositionReceiver = oneshot::Receiver<Disposition>;

/// A message received from a remote peer.
#[derive(Debug)]
pub struct InboundMessage {
    source_legal_name: String,
    topic: String,
    payload: Vec<u8>,
    application_properties: Headers,
    completion: Option<oneshot::Sender<Disposition>>,
}

impl InboundMessage {
    /// Create a message and the receiver its disposition will arrive on.
    pub fn new(
        source_legal_name: impl Into<String>,
        topic: impl Into<String>,
        payload: impl Into<Vec<u8>>,
        application_properties: Headers,
    ) -> (Self, DispositionReceiver) {
        let (tx, rx) = oneshot::channel();
        let message = Self {
            source_legal_name: source_legal_name.into(),
            topic: topic.into(),
            payload: payload.into(),
            application_properties,
            completion: Some(tx),
        };
        (message, rx)
    }

    /// Unvalidated source identity as presented by the remote peer.
    #[must_use]
    pub fn source_legal_name(&self) -> &str {
        &self.source_legal_name
    }

    /// Destination address on the internal broker.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    #[must_use]
    pub fn application_properties(&self) -> &Headers {
        &self.application_properties
    }

    /// Idempotency token, if the sender attached one.
    #[must_use]
    pub fn idempotency_token(&self) -> Option<String> {
        self.application_properties
            .get(DUPLICATE_ID_HEADER)
            .and_then(|v| v.as_token())
    }

    /// Consume and discard. Used for input that can never become valid.
    pub fn consume(self) {
        self.complete(Disposition::Dropped);
    }

    /// Consume after the broker accepted the forwarded copy.
    pub fn forwarded(self) {
        self.complete(Disposition::Forwarded);
    }

    /// Reject so that the source redelivers.
    pub fn reject(self) {
        self.complete(Disposition::Redeliver);
    }

    fn complete(mut self, disposition: Disposition) {
        if let Some(tx) = self.completion.take() {
            // The transport may already have gone away; nothing left to tell.
            let _ = tx.send(disposition);
        }
    }
}

impl Drop for InboundMessage {
    fn drop(&mut self) {
        if let Some(tx) = self.completion.take() {
            warn!(
                topic = %self.topic,
                source = %self.source_legal_name,
                "Inbound message dropped without disposition, requesting redelivery"
            );
            let _ = tx.send(Disposition::Redeliver);
        }
    }
}
