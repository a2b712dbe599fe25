//! # Core Entities
//!
//! Small value types that travel across the trust boundary together with
//! every inbound message.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Header stamped on every forwarded message carrying the source identity
/// that was authenticated at the edge.
pub const BRIDGED_CERTIFICATE_SUBJECT: &str = "sender-subject-name";

/// Broker duplicate-detection header, used as the idempotency token.
pub const DUPLICATE_ID_HEADER: &str = "_AMQ_DUPL_ID";

/// Prefix of every legitimate peer inbox address on the internal broker.
pub const P2P_INBOUND_PREFIX: &str = "p2p.inbound.";

/// Application headers permitted across the boundary when no explicit
/// whitelist is configured.
pub const DEFAULT_WHITELISTED_HEADERS: &[&str] = &[
    "platform-topic",
    "corda-vendor",
    "release-version",
    "platform-version",
    "sender-uuid",
    "send-seq-no",
    DUPLICATE_ID_HEADER,
    BRIDGED_CERTIFICATE_SUBJECT,
];

/// Direction of travel relative to the firewall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoutingDirection {
    /// From a remote peer towards the internal broker.
    Inbound,
    /// From the internal broker towards a remote peer.
    Outbound,
}

impl fmt::Display for RoutingDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inbound => write!(f, "inbound"),
            Self::Outbound => write!(f, "outbound"),
        }
    }
}

/// A single application header value.
///
/// Mirrors the property types the broker accepts on a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Bool(bool),
    Int(i64),
    Text(String),
    Bytes(Vec<u8>),
}

impl HeaderValue {
    /// Render the value as a token string, if it has a textual form.
    #[must_use]
    pub fn as_token(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Int(i) => Some(i.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Bytes(_) => None,
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for HeaderValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for HeaderValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Ordered application headers keyed by name.
pub type Headers = BTreeMap<String, HeaderValue>;
