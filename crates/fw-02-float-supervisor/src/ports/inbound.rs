//! Inbound (Driving) port for the float supervisor.

use shared_bus::ServiceStateSupport;

/// Lifecycle of the float side of a split deployment.
pub trait FloatSupervisor: ServiceStateSupport {
    /// Start the listener, then the control channel, then mirror their
    /// aggregated liveness.
    ///
    /// Must be called from within a Tokio runtime.
    fn start(&self);

    /// Mark inactive, stop the control channel, stop the listener, release
    /// the liveness subscription. Idempotent.
    fn stop(&self);
}
