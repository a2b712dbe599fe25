//! # Shared Bus - Liveness Propagation Between Firewall Services
//!
//! Every long-lived firewall service exposes a boolean "active" status. This
//! crate carries those statuses between services and folds them together.
//!
//! ## Liveness Graph
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ Audit        │   │ Broker Conn  │   │ Inbox Topics │
//! └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!        │ subscribe()      │                  │
//!        └──────────────────┼──────────────────┘
//!                           ▼
//!                  ┌──────────────────┐
//!                  │ LivenessAggregator│ ── AND of all ──→ ServiceState
//!                  └──────────────────┘
//! ```
//!
//! An aggregator's output is itself a [`ServiceState`], so aggregators chain.
//!
//! ## Dedup Bookkeeping
//!
//! [`TimeBoundedDedupCache`] remembers recently seen keys for a bounded time
//! and count, used to log repeated forwarding failures only once.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod aggregator;
pub mod dedup_cache;
pub mod state;
pub mod subscription;

// Re-export main types
pub use aggregator::LivenessAggregator;
pub use dedup_cache::TimeBoundedDedupCache;
pub use state::{ServiceState, ServiceStateSupport};
pub use subscription::StatusSubscription;
