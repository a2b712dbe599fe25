//! # Firewall Runtime Library
//!
//! Exposes the runtime's configuration loading, service registry and
//! container wiring for testing. The entry point is the `main.rs` binary.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging (`fw-telemetry`)
//! 2. Load configuration (TOML file, then `FW_*` overrides) and validate it
//! 3. Resolve the service for the configured mode from the registry
//! 4. Start it and wait for Ctrl+C
//! 5. Stop it

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod container;
pub mod registry;

pub use container::{load_config, load_config_from, InboxBinding, RuntimeConfig, RuntimeConfigError};
pub use registry::{FirewallService, RegistryError, ServiceError, ServiceRegistry};
