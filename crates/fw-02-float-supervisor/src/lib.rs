//! # Float Supervisor
//!
//! **Subsystem ID:** 2
//! **Role:** Lifecycle owner of the externally facing half of a split deployment
//!
//! ## Purpose
//!
//! Owns the network listener and, in float-outer mode, the control channel to
//! the bridge. Its own activity is the conjunction of the services it owns, so
//! it can be chained into a higher level aggregator like any other service.
//!
//! | Mode | Listener | Control channel |
//! |------|----------|-----------------|
//! | `float-outer` | yes | yes |
//! | `bridge-inner` | yes | no |
//! | `combined` | yes | no |
//!
//! A float-outer configuration with HA settings is refused at construction.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::{NoOpControlChannel, NoOpListener};
pub use error::SupervisorError;
pub use ports::{ControlChannelService, FloatSupervisor, ListenerService};
pub use service::{FloatSupervisorService, BASIC_INFO_TARGET};
