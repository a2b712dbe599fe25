//! # Firewall Configuration
//!
//! Process-wide settings read once at startup and shared immutably.
//!
//! ## Invariants
//!
//! - A `FloatOuter` process never carries `HaConfig`; failover is owned by
//!   the bridge side.
//! - The header whitelist is never empty.

use crate::entities::DEFAULT_WHITELISTED_HEADERS;
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Which half (or halves) of a split deployment this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FirewallMode {
    /// Internally trusted half: validates and forwards into the broker.
    BridgeInner,
    /// Externally facing half: terminates network connections only.
    FloatOuter,
    /// Both halves in a single process.
    Combined,
}

impl FirewallMode {
    /// Canonical configuration identifier.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::BridgeInner => "bridge-inner",
            Self::FloatOuter => "float-outer",
            Self::Combined => "combined",
        }
    }

    /// All modes, in declaration order.
    #[must_use]
    pub fn all() -> [FirewallMode; 3] {
        [Self::BridgeInner, Self::FloatOuter, Self::Combined]
    }
}

impl fmt::Display for FirewallMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FirewallMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::all()
            .into_iter()
            .find(|mode| mode.name() == normalized)
            .ok_or_else(|| ConfigError::UnknownMode(s.to_string()))
    }
}

/// High-availability settings (bridge side only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HaConfig {
    /// Lock name contended by bridge replicas.
    pub ha_connection_string: String,
    /// Priority of this replica; lower wins.
    #[serde(default)]
    pub ha_priority: u32,
}

/// Bounds of the forwarding-failure dedup cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCacheConfig {
    /// Maximum number of remembered idempotency tokens.
    pub max_entries: usize,
    /// Lifetime of a remembered token in seconds.
    pub expiry_secs: u64,
}

impl FilterCacheConfig {
    pub const DEFAULT_MAX_ENTRIES: usize = 100;
    pub const DEFAULT_EXPIRY_SECS: u64 = 10;

    #[must_use]
    pub fn expiry(&self) -> Duration {
        Duration::from_secs(self.expiry_secs)
    }
}

impl Default for FilterCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: Self::DEFAULT_MAX_ENTRIES,
            expiry_secs: Self::DEFAULT_EXPIRY_SECS,
        }
    }
}

/// Complete firewall configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallConfiguration {
    pub firewall_mode: FirewallMode,
    #[serde(default = "default_whitelist")]
    pub whitelisted_headers: BTreeSet<String>,
    #[serde(default)]
    pub ha_config: Option<HaConfig>,
    #[serde(default)]
    pub filter_cache: FilterCacheConfig,
}

fn default_whitelist() -> BTreeSet<String> {
    DEFAULT_WHITELISTED_HEADERS
        .iter()
        .map(|h| (*h).to_string())
        .collect()
}

impl FirewallConfiguration {
    /// Configuration for `mode` with default whitelist and cache bounds.
    #[must_use]
    pub fn new(mode: FirewallMode) -> Self {
        Self {
            firewall_mode: mode,
            whitelisted_headers: default_whitelist(),
            ha_config: None,
            filter_cache: FilterCacheConfig::default(),
        }
    }

    /// Replace the header whitelist.
    #[must_use]
    pub fn with_whitelist<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.whitelisted_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_ha_config(mut self, ha_config: HaConfig) -> Self {
        self.ha_config = Some(ha_config);
        self
    }

    #[must_use]
    pub fn with_filter_cache(mut self, filter_cache: FilterCacheConfig) -> Self {
        self.filter_cache = filter_cache;
        self
    }

    /// Check the startup invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.firewall_mode == FirewallMode::FloatOuter && self.ha_config.is_some() {
            return Err(ConfigError::FloatWithHaConfig);
        }
        if self.whitelisted_headers.is_empty() {
            return Err(ConfigError::EmptyHeaderWhitelist);
        }
        if self.filter_cache.max_entries == 0 {
            return Err(ConfigError::InvalidCacheBound {
                field: "max_entries",
            });
        }
        if self.filter_cache.expiry_secs == 0 {
            return Err(ConfigError::InvalidCacheBound {
                field: "expiry_secs",
            });
        }
        Ok(())
    }
}
