//! # Runtime Configuration
//!
//! Firewall configuration plus the development inbox bindings, loaded from an
//! optional TOML file and then overridden from the environment.
//!
//! ```toml
//! firewall_mode = "bridge-inner"
//!
//! [filter_cache]
//! max_entries = 100
//! expiry_secs = 10
//!
//! [[inboxes]]
//! owner = "O=Bank A, L=London, C=GB"
//! inbox = "bank-a"
//! ```
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `FW_CONFIG` | path of the TOML file |
//! | `FW_FIREWALL_MODE` | `firewall_mode` |
//! | `FW_FILTER_CACHE_MAX_SIZE` | `filter_cache.max_entries` |
//! | `FW_FILTER_CACHE_EXPIRY_SECS` | `filter_cache.expiry_secs` |

use serde::{Deserialize, Serialize};
use shared_types::{ConfigError, FirewallConfiguration, FirewallMode};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const CONFIG_PATH_VAR: &str = "FW_CONFIG";
pub const MODE_VAR: &str = "FW_FIREWALL_MODE";
pub const CACHE_MAX_SIZE_VAR: &str = "FW_FILTER_CACHE_MAX_SIZE";
pub const CACHE_EXPIRY_VAR: &str = "FW_FILTER_CACHE_EXPIRY_SECS";

/// An inbox registered for a legal identity at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxBinding {
    /// Distinguished name of the owning node.
    pub owner: String,
    pub inbox: String,
}

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(flatten)]
    pub firewall: FirewallConfiguration,
    #[serde(default)]
    pub inboxes: Vec<InboxBinding>,
}

impl RuntimeConfig {
    #[must_use]
    pub fn new(firewall: FirewallConfiguration) -> Self {
        Self {
            firewall,
            inboxes: Vec::new(),
        }
    }

    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// Malformed TOML or unknown mode names.
    pub fn from_toml(text: &str) -> Result<Self, RuntimeConfigError> {
        toml::from_str(text).map_err(|e| RuntimeConfigError::Parse(e.to_string()))
    }

    #[must_use]
    pub fn mode(&self) -> FirewallMode {
        self.firewall.firewall_mode
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(FirewallConfiguration::new(FirewallMode::BridgeInner))
    }
}

/// Errors raised while loading configuration. All are fatal at startup.
#[derive(Debug, Error)]
pub enum RuntimeConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Invalid value '{value}' for {var}")]
    InvalidOverride { var: &'static str, value: String },

    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Load configuration from `FW_CONFIG` and the process environment.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<RuntimeConfig, RuntimeConfigError> {
    let path = std::env::var(CONFIG_PATH_VAR).ok().map(PathBuf::from);
    load_config_from(path.as_deref(), |key| std::env::var(key).ok())
}

/// Load configuration from `path` (defaults when `None`), apply overrides
/// looked up through `env`, then validate.
///
/// # Errors
///
/// An unreadable or malformed file, an unparseable override, or a
/// configuration violating its startup invariants.
pub fn load_config_from<E>(path: Option<&Path>, env: E) -> Result<RuntimeConfig, RuntimeConfigError>
where
    E: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| RuntimeConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            info!(path = %path.display(), "Loaded configuration file");
            RuntimeConfig::from_toml(&text)?
        }
        None => RuntimeConfig::default(),
    };

    if let Some(mode) = env(MODE_VAR) {
        config.firewall.firewall_mode = mode.parse()?;
    }
    if let Some(value) = env(CACHE_MAX_SIZE_VAR) {
        config.firewall.filter_cache.max_entries =
            value.trim().parse().map_err(|_| RuntimeConfigError::InvalidOverride {
                var: CACHE_MAX_SIZE_VAR,
                value,
            })?;
    }
    if let Some(value) = env(CACHE_EXPIRY_VAR) {
        config.firewall.filter_cache.expiry_secs =
            value.trim().parse().map_err(|_| RuntimeConfigError::InvalidOverride {
                var: CACHE_EXPIRY_VAR,
                value,
            })?;
    }

    config.firewall.validate()?;
    Ok(config)
}
