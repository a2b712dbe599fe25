//! # Message Filter Metrics
//!
//! Prometheus metrics for the inbound gate.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! fw-01-message-filter = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `firewall_inbound_dropped_total` - Counter of dropped packets (by reason class)
//! - `firewall_inbound_accepted_total` - Counter of packets acknowledged by the broker
//! - `firewall_forward_failures_total` - Counter of forwarding failures (by first/repeat)
//! - `firewall_gate_active` - Gauge of the gate's active status (0/1)
//! - `firewall_forward_submit_seconds` - Histogram of broker submission time

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_gauge, register_histogram, register_int_counter, register_int_counter_vec, Gauge,
    Histogram, IntCounter, IntCounterVec,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Dropped packets, labeled by reason class
    pub static ref INBOUND_DROPPED: IntCounterVec = register_int_counter_vec!(
        "firewall_inbound_dropped_total",
        "Total number of inbound packets dropped by the filter",
        &["reason"]
    )
    .expect("Failed to create INBOUND_DROPPED metric");

    /// Packets acknowledged by the broker
    pub static ref INBOUND_ACCEPTED: IntCounter = register_int_counter!(
        "firewall_inbound_accepted_total",
        "Total number of inbound packets accepted by the broker"
    )
    .expect("Failed to create INBOUND_ACCEPTED metric");

    /// Forwarding failures, labeled first/repeat
    pub static ref FORWARD_FAILURES: IntCounterVec = register_int_counter_vec!(
        "firewall_forward_failures_total",
        "Total number of failed forwarding attempts",
        &["occurrence"]
    )
    .expect("Failed to create FORWARD_FAILURES metric");

    /// Gate active flag
    pub static ref GATE_ACTIVE: Gauge = register_gauge!(
        "firewall_gate_active",
        "Whether the inbound gate is currently active (0=no, 1=yes)"
    )
    .expect("Failed to create GATE_ACTIVE metric");

    /// Submission time
    pub static ref FORWARD_SUBMIT_SECONDS: Histogram = register_histogram!(
        "firewall_forward_submit_seconds",
        "Time spent submitting a message to the broker producer"
    )
    .expect("Failed to create FORWARD_SUBMIT_SECONDS metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a dropped packet with its reason class
#[cfg(feature = "metrics")]
pub fn record_dropped(reason: &str) {
    INBOUND_DROPPED.with_label_values(&[reason]).inc();
}

/// Record a broker acknowledgement
#[cfg(feature = "metrics")]
pub fn record_accepted() {
    INBOUND_ACCEPTED.inc();
}

/// Record a forwarding failure
#[cfg(feature = "metrics")]
pub fn record_forward_failure(first_occurrence: bool) {
    let label = if first_occurrence { "first" } else { "repeat" };
    FORWARD_FAILURES.with_label_values(&[label]).inc();
}

/// Record the gate's active flag
#[cfg(feature = "metrics")]
pub fn set_gate_active(active: bool) {
    GATE_ACTIVE.set(if active { 1.0 } else { 0.0 });
}

/// Record the submission time
#[cfg(feature = "metrics")]
pub fn observe_submit_seconds(seconds: f64) {
    FORWARD_SUBMIT_SECONDS.observe(seconds);
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature is disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_dropped(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_accepted() {}

#[cfg(not(feature = "metrics"))]
pub fn record_forward_failure(_first_occurrence: bool) {}

#[cfg(not(feature = "metrics"))]
pub fn set_gate_active(_active: bool) {}

#[cfg(not(feature = "metrics"))]
pub fn observe_submit_seconds(_seconds: f64) {}
