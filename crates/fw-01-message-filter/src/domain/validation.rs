//! # Inbound Validation
//!
//! Rules applied to every message before it may cross into the broker. All
//! must pass; the first failure short-circuits.
//!
//! | Order | Rule | Failure |
//! |-------|------|---------|
//! | 1 | Source identity parses as a legal name | `InvalidSourceIdentity` (security) |
//! | 2 | Payload is non-empty | `EmptyPayload` |
//! | 3 | Topic is a legitimate inbox for the source | `IllegitimateTopic` (security) |
//! | 4 | Every header key is whitelisted | `DisallowedHeader` |
//!
//! Header validation *rejects* unknown keys. Building the outbound message
//! separately *filters* keys; see [`OutboundMessage::from_inbound`].
//!
//! [`OutboundMessage::from_inbound`]: super::OutboundMessage::from_inbound

use super::errors::FilterError;
use shared_types::{InboundMessage, LegalName};
use std::collections::BTreeSet;

/// Stateless validator bound to a header whitelist.
#[derive(Debug, Clone)]
pub struct MessageValidator {
    whitelist: BTreeSet<String>,
}

impl MessageValidator {
    #[must_use]
    pub fn new(whitelist: BTreeSet<String>) -> Self {
        Self { whitelist }
    }

    #[must_use]
    pub fn whitelist(&self) -> &BTreeSet<String> {
        &self.whitelist
    }

    /// Validate `message`, consulting `is_legitimate_inbox` for rule 3.
    ///
    /// Returns the parsed source identity on success.
    ///
    /// # Errors
    ///
    /// The first violated rule.
    pub fn validate<F>(
        &self,
        message: &InboundMessage,
        is_legitimate_inbox: F,
    ) -> Result<LegalName, FilterError>
    where
        F: FnOnce(&str, &LegalName) -> bool,
    {
        let source = LegalName::parse(message.source_legal_name()).map_err(|cause| {
            FilterError::InvalidSourceIdentity {
                name: message.source_legal_name().to_string(),
                cause,
            }
        })?;

        if message.payload().is_empty() {
            return Err(FilterError::EmptyPayload);
        }

        if !is_legitimate_inbox(message.topic(), &source) {
            return Err(FilterError::IllegitimateTopic {
                topic: message.topic().to_string(),
            });
        }

        let headers = message.application_properties();
        if let Some(header) = headers.keys().find(|k| !self.whitelist.contains(*k)) {
            return Err(FilterError::DisallowedHeader {
                header: header.clone(),
                present: headers.keys().cloned().collect(),
            });
        }

        Ok(source)
    }
}
