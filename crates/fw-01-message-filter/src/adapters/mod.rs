//! Adapters implementing the message filter's outbound ports.
//!
//! - `in_memory_broker` - broker connection/session/producer held in memory
//! - `tracing_audit` - audit sink writing structured log records
//! - `inbox_registry` - routing legitimacy from a registry of known inboxes

pub mod in_memory_broker;
pub mod inbox_registry;
pub mod tracing_audit;

pub use in_memory_broker::{DeliveredMessage, InMemoryBroker, InMemoryProducer, InMemorySession};
pub use inbox_registry::InboxRegistry;
pub use tracing_audit::{AuditEvent, AuditEventKind, AuditStats, TracingAuditService};
