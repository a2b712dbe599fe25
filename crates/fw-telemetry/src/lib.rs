//! # Firewall Telemetry
//!
//! Logging setup shared by every firewall process.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fw_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(TelemetryConfig::from_env())?;
//!     // Application code here
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `FW_SERVICE_NAME` | `corda-firewall` | Service name in logs |
//! | `FW_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `FW_JSON_LOGS` | `false` (`true` in containers) | JSON output |
//! | `FW_CONSOLE_COLOURS` | `true` (`false` in containers) | ANSI colours |
//! | `FW_LOG_SOURCE` | `false` | File and line in each record |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::build_filter;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Initialize logging for the process.
///
/// Returns a guard that should be held for the lifetime of the application.
///
/// # Errors
///
/// Fails if the filter is invalid or a global subscriber is already set.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    logging::init_logging(&config)?;
    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}
