//! Message filter error types.
//!
//! Validation failures never escape `handle_inbound`; they become the reason
//! string of a drop audit event.

use shared_types::LegalNameError;
use thiserror::Error;

/// Classification used by audit and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterErrorKind {
    /// The peer claimed an identity or destination it is not entitled to.
    Security,
    /// The message is structurally unacceptable.
    Validation,
}

impl FilterErrorKind {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Security => "security",
            Self::Validation => "validation",
        }
    }
}

/// Why an inbound message failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// Source identity does not parse as a legal name.
    #[error("Invalid Legal Name {name}")]
    InvalidSourceIdentity {
        name: String,
        #[source]
        cause: LegalNameError,
    },

    #[error("No valid payload")]
    EmptyPayload,

    /// Topic is not an inbox the source may write to.
    #[error("Topic not a legitimate Inbox for a node on this Artemis Broker {topic}")]
    IllegitimateTopic { topic: String },

    /// At least one application header is outside the whitelist.
    #[error("Disallowed header present in {present:?}")]
    DisallowedHeader {
        header: String,
        present: Vec<String>,
    },
}

impl FilterError {
    #[must_use]
    pub fn kind(&self) -> FilterErrorKind {
        match self {
            Self::InvalidSourceIdentity { .. } | Self::IllegitimateTopic { .. } => {
                FilterErrorKind::Security
            }
            Self::EmptyPayload | Self::DisallowedHeader { .. } => FilterErrorKind::Validation,
        }
    }

    #[must_use]
    pub fn is_security(&self) -> bool {
        self.kind() == FilterErrorKind::Security
    }
}

/// Failures reported by the internal broker collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    /// The broker connection itself is not usable.
    #[error("Broker connection unavailable: {0}")]
    ConnectionUnavailable(String),

    #[error("Failed to create session: {0}")]
    SessionCreation(String),

    #[error("Failed to create producer: {0}")]
    ProducerCreation(String),

    /// No session/producer pair is currently open.
    #[error("No artemis connection to forward message over")]
    NoSession,

    /// The session was closed while in use.
    #[error("Session closed")]
    SessionClosed,

    #[error("Send to {address} failed: {reason}")]
    SendFailed { address: String, reason: String },
}
