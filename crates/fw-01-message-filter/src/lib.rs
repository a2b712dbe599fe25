//! # Message Filter Gate
//!
//! **Subsystem ID:** 1
//! **Role:** Bridge-side gate between peer transport and the internal broker
//!
//! ## Purpose
//!
//! Decides, for every inbound message crossing the trust boundary, whether it
//! is safe and correctly addressed, then forwards it into the internal broker
//! with broker acknowledgement plumbing. Traffic is only accepted while every
//! dependency (audit, broker connection, inbox registry) is active.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Exactly one disposition per message | `shared_types::InboundMessage` consumes on dispose |
//! | Malformed input is never redelivered | `service.rs` - validation failure path |
//! | No send through a link being torn down | `service.rs` - link `RwLock` |
//! | Link exists only while dependencies are active | `service.rs` - `on_dependencies_changed()` |
//! | Bounded failure log volume | `service.rs` - `report_forward_failure()` |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      OUTER LAYER                                │
//! │  adapters/ - in-memory broker, tracing audit, inbox registry   │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  ports/inbound.rs  - IncomingMessageFilter trait               │
//! │  ports/outbound.rs - BrokerConnection, InboxTopicValidator,    │
//! │                      FirewallAuditService traits               │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  domain/validation.rs - MessageValidator rule chain            │
//! │  domain/outbound.rs   - OutboundMessage construction           │
//! │  domain/errors.rs     - FilterError, BrokerError               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

pub use adapters::*;
pub use domain::*;
pub use ports::*;
pub use service::{FilterStats, MessageFilterService};
