//! Message handed to the internal broker.

use shared_types::{HeaderValue, Headers, InboundMessage, BRIDGED_CERTIFICATE_SUBJECT};
use std::collections::BTreeSet;

/// Broker-bound copy of a validated inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Header subset that crossed the boundary plus the bridged identity.
    pub properties: Headers,
    /// Payload, byte for byte.
    pub body: Vec<u8>,
    /// Persisted by the broker before acknowledgement.
    pub durable: bool,
}

impl OutboundMessage {
    /// Copy whitelisted headers present on `message`, stamp the bridged
    /// source identity and copy the payload.
    ///
    /// Keys outside `whitelist` are skipped silently.
    #[must_use]
    pub fn from_inbound(message: &InboundMessage, whitelist: &BTreeSet<String>) -> Self {
        let inbound = message.application_properties();
        let mut properties: Headers = whitelist
            .iter()
            .filter_map(|key| inbound.get(key).map(|v| (key.clone(), v.clone())))
            .collect();
        properties.insert(
            BRIDGED_CERTIFICATE_SUBJECT.to_string(),
            HeaderValue::Text(message.source_legal_name().to_string()),
        );
        Self {
            properties,
            body: message.payload().to_vec(),
            durable: true,
        }
    }

    /// Identity stamped by the bridge.
    #[must_use]
    pub fn bridged_identity(&self) -> Option<&str> {
        match self.properties.get(BRIDGED_CERTIFICATE_SUBJECT) {
            Some(HeaderValue::Text(name)) => Some(name),
            _ => None,
        }
    }
}
