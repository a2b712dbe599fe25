//! # Service Registry
//!
//! Maps a configuration identifier (a firewall mode name) to a constructor
//! for the service that mode runs. The registry is populated statically at
//! startup and resolved once.
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                 ServiceRegistry                  │
//! │                                                  │
//! │  "bridge-inner" ──→ BridgeInnerService           │
//! │  "float-outer"  ──→ FloatOuterService            │
//! │  "combined"     ──→ CombinedService              │
//! └──────────────────────────────────────────────────┘
//!                         │ resolve(config)
//!                         ▼
//!               Box<dyn FirewallService>
//! ```

use std::collections::BTreeMap;

use fw_01_message_filter::IncomingMessageFilter;
use fw_02_float_supervisor::SupervisorError;
use shared_types::{ConfigError, FirewallMode, LegalNameError};
use thiserror::Error;
use tracing::info;

use crate::container::{BridgeInnerService, CombinedService, FloatOuterService, RuntimeConfig};

/// A top-level firewall service driven by the runtime.
#[async_trait::async_trait]
pub trait FirewallService: Send + Sync {
    /// Configuration identifier this service was resolved from.
    fn name(&self) -> &'static str;

    /// Start the service and everything it owns.
    ///
    /// Must be called from within a Tokio runtime.
    async fn start(&self) -> Result<(), ServiceError>;

    /// Stop the service. Idempotent.
    async fn stop(&self);

    fn is_active(&self) -> bool;

    /// The inbound gate, when this service runs one.
    fn message_filter(&self) -> Option<&dyn IncomingMessageFilter> {
        None
    }
}

/// Errors raised while constructing or starting a service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Supervisor(#[from] SupervisorError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid inbox owner '{owner}': {source}")]
    InboxOwner {
        owner: String,
        #[source]
        source: LegalNameError,
    },
}

/// Registry errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Unknown firewall service '{name}' (available: {})", .available.join(", "))]
    UnknownService {
        name: String,
        available: Vec<String>,
    },

    #[error("Failed to construct service '{name}': {source}")]
    Construction {
        name: String,
        #[source]
        source: ServiceError,
    },
}

/// Constructor producing a service from configuration.
pub type ServiceConstructor =
    Box<dyn Fn(&RuntimeConfig) -> Result<Box<dyn FirewallService>, ServiceError> + Send + Sync>;

/// Static map from configuration identifier to service constructor.
pub struct ServiceRegistry {
    constructors: BTreeMap<String, ServiceConstructor>,
}

impl ServiceRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// A registry holding one service per firewall mode.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(FirewallMode::BridgeInner.name(), |config| {
            Ok(Box::new(BridgeInnerService::new(config)?) as Box<dyn FirewallService>)
        });
        registry.register(FirewallMode::FloatOuter.name(), |config| {
            Ok(Box::new(FloatOuterService::new(config)?) as Box<dyn FirewallService>)
        });
        registry.register(FirewallMode::Combined.name(), |config| {
            Ok(Box::new(CombinedService::new(config)?) as Box<dyn FirewallService>)
        });
        registry
    }

    /// Register (or replace) the constructor for `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn(&RuntimeConfig) -> Result<Box<dyn FirewallService>, ServiceError>
            + Send
            + Sync
            + 'static,
    {
        self.constructors.insert(name.into(), Box::new(constructor));
    }

    /// Registered identifiers, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.constructors.keys().cloned().collect()
    }

    /// Build the service named `name`.
    ///
    /// # Errors
    ///
    /// An unregistered name, or a constructor failure.
    pub fn create(
        &self,
        name: &str,
        config: &RuntimeConfig,
    ) -> Result<Box<dyn FirewallService>, RegistryError> {
        let constructor =
            self.constructors
                .get(name)
                .ok_or_else(|| RegistryError::UnknownService {
                    name: name.to_string(),
                    available: self.names(),
                })?;
        info!("[Registry] Constructing service: {}", name);
        constructor(config).map_err(|source| RegistryError::Construction {
            name: name.to_string(),
            source,
        })
    }

    /// Build the service for the configured firewall mode.
    ///
    /// # Errors
    ///
    /// See [`ServiceRegistry::create`].
    pub fn resolve(&self, config: &RuntimeConfig) -> Result<Box<dyn FirewallService>, RegistryError> {
        self.create(config.mode().name(), config)
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
