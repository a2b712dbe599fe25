//! Inbound (Driving) port for the message filter.

use shared_bus::ServiceStateSupport;
use shared_types::InboundMessage;

/// Gate between peer transport and the internal broker.
pub trait IncomingMessageFilter: ServiceStateSupport {
    /// Follow dependency liveness and open broker resources while it holds.
    ///
    /// Must be called from within a Tokio runtime.
    fn start(&self);

    /// Release broker resources and stop following liveness. Idempotent.
    fn stop(&self);

    /// Validate and forward `message`, or dispose of it.
    ///
    /// Never fails: every outcome is a disposition on the message plus,
    /// where applicable, an audit event.
    fn send_message_to_local_broker(&self, message: InboundMessage);
}
