//! Outbound (Driven) ports for the float supervisor.

use shared_bus::ServiceStateSupport;

/// Externally reachable network listener. Always present.
pub trait ListenerService: ServiceStateSupport + 'static {
    fn start(&self);

    /// Must tolerate repeated calls.
    fn stop(&self);
}

/// Authenticated channel through which the bridge pushes TLS material,
/// routing policy and commands to the float. Only present on a float-outer
/// process, and built on top of its listener.
pub trait ControlChannelService: ServiceStateSupport + 'static {
    fn start(&self);

    /// Must tolerate repeated calls.
    fn stop(&self);
}
