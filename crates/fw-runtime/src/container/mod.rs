//! # Service Container
//!
//! Runtime configuration and the concrete services built for each firewall
//! mode.

pub mod config;
pub mod services;

pub use config::{load_config, load_config_from, InboxBinding, RuntimeConfig, RuntimeConfigError};
pub use services::{BridgeInnerService, CombinedService, FloatOuterService};
