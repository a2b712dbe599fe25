//! # Tracing Audit Service
//!
//! Writes every audit event as a structured log record and keeps per
//! direction counters plus a bounded window of recent events.

use crate::ports::FirewallAuditService;
use parking_lot::Mutex;
use shared_bus::{ServiceState, ServiceStateSupport};
use shared_types::{InboundMessage, RoutingDirection};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditEventKind {
    Dropped { reason: String },
    Accepted,
}

/// One recorded audit event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub id: Uuid,
    pub kind: AuditEventKind,
    pub direction: RoutingDirection,
    pub topic: String,
    pub source: String,
    pub msg_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditStats {
    pub inbound_dropped: u64,
    pub inbound_accepted: u64,
    pub outbound_dropped: u64,
    pub outbound_accepted: u64,
}

#[derive(Default)]
struct Counters {
    inbound_dropped: AtomicU64,
    inbound_accepted: AtomicU64,
    outbound_dropped: AtomicU64,
    outbound_accepted: AtomicU64,
}

/// Audit sink backed by `tracing`.
pub struct TracingAuditService {
    state: ServiceState,
    counters: Counters,
    recent: Mutex<VecDeque<AuditEvent>>,
    recent_capacity: usize,
}

impl TracingAuditService {
    pub const DEFAULT_RECENT_CAPACITY: usize = 1024;

    #[must_use]
    pub fn new() -> Self {
        Self::with_recent_capacity(Self::DEFAULT_RECENT_CAPACITY)
    }

    #[must_use]
    pub fn with_recent_capacity(recent_capacity: usize) -> Self {
        Self {
            state: ServiceState::new("audit"),
            counters: Counters::default(),
            recent: Mutex::new(VecDeque::with_capacity(recent_capacity.min(1024))),
            recent_capacity,
        }
    }

    pub fn start(&self) {
        self.state.set_active(true);
    }

    pub fn stop(&self) {
        self.state.set_active(false);
    }

    #[must_use]
    pub fn stats(&self) -> AuditStats {
        AuditStats {
            inbound_dropped: self.counters.inbound_dropped.load(Ordering::Relaxed),
            inbound_accepted: self.counters.inbound_accepted.load(Ordering::Relaxed),
            outbound_dropped: self.counters.outbound_dropped.load(Ordering::Relaxed),
            outbound_accepted: self.counters.outbound_accepted.load(Ordering::Relaxed),
        }
    }

    /// Recent events, oldest first.
    #[must_use]
    pub fn recent_events(&self) -> Vec<AuditEvent> {
        self.recent.lock().iter().cloned().collect()
    }

    fn record(&self, message: &InboundMessage, kind: AuditEventKind, direction: RoutingDirection) {
        let event = AuditEvent {
            id: Uuid::new_v4(),
            kind,
            direction,
            topic: message.topic().to_string(),
            source: message.source_legal_name().to_string(),
            msg_id: message.idempotency_token(),
        };
        if self.recent_capacity == 0 {
            return;
        }
        let mut recent = self.recent.lock();
        if recent.len() == self.recent_capacity {
            recent.pop_front();
        }
        recent.push_back(event);
    }
}

impl Default for TracingAuditService {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceStateSupport for TracingAuditService {
    fn service_state(&self) -> &ServiceState {
        &self.state
    }
}

impl FirewallAuditService for TracingAuditService {
    fn packet_drop_event(&self, message: &InboundMessage, reason: &str, direction: RoutingDirection) {
        let counter = match direction {
            RoutingDirection::Inbound => &self.counters.inbound_dropped,
            RoutingDirection::Outbound => &self.counters.outbound_dropped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        warn!(
            target: "audit",
            %direction,
            topic = %message.topic(),
            source = %message.source_legal_name(),
            reason,
            "Packet dropped"
        );
        self.record(
            message,
            AuditEventKind::Dropped {
                reason: reason.to_string(),
            },
            direction,
        );
    }

    fn packet_accepted_event(&self, message: &InboundMessage, direction: RoutingDirection) {
        let counter = match direction {
            RoutingDirection::Inbound => &self.counters.inbound_accepted,
            RoutingDirection::Outbound => &self.counters.outbound_accepted,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        info!(
            target: "audit",
            %direction,
            topic = %message.topic(),
            source = %message.source_legal_name(),
            "Packet accepted"
        );
        self.record(message, AuditEventKind::Accepted, direction);
    }
}
