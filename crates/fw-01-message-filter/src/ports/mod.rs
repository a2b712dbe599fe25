//! Ports (hexagonal boundaries) for the message filter.

pub mod inbound;
pub mod outbound;

pub use inbound::IncomingMessageFilter;
pub use outbound::{
    AckHandle, BrokerConnection, BrokerProducer, BrokerSession, FirewallAuditService,
    InboxTopicValidator, SendReceipt,
};
