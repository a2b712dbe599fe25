//! Ports (hexagonal boundaries) for the float supervisor.

pub mod inbound;
pub mod outbound;

pub use inbound::FloatSupervisor;
pub use outbound::{ControlChannelService, ListenerService};
