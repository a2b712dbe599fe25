//! # Shared Types Crate
//!
//! Value types used by every firewall service.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: configuration, identities and the inbound
//!   message contract are defined once, here.
//! - **Disposition by ownership**: an `InboundMessage` is disposed of by
//!   consuming it, so double disposition cannot compile and a forgotten one
//!   falls back to redelivery.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod entities;
pub mod errors;
pub mod identity;
pub mod message;

pub use config::{FilterCacheConfig, FirewallConfiguration, FirewallMode, HaConfig};
pub use entities::*;
pub use errors::*;
pub use identity::LegalName;
pub use message::{Disposition, DispositionReceiver, InboundMessage};
