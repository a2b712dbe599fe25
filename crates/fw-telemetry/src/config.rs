//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for firewall logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or full directive
    pub log_level: String,

    /// Whether to emit ANSI colours on the console
    pub console_colours: bool,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,

    /// Whether to include source file and line in each record
    pub with_source_location: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "corda-firewall".to_string(),
            log_level: "info".to_string(),
            console_colours: true,
            json_logs: false,
            with_source_location: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `FW_SERVICE_NAME`: Service name (default: corda-firewall)
    /// - `FW_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `FW_CONSOLE_COLOURS`: ANSI colours (default: true)
    /// - `FW_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    /// - `FW_LOG_SOURCE`: Include file/line (default: false)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("FW_SERVICE_NAME")
                .unwrap_or_else(|_| "corda-firewall".to_string()),

            log_level: env::var("FW_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_colours: env::var("FW_CONSOLE_COLOURS")
                .map(|v| parse_flag(&v))
                .unwrap_or(!is_container),

            json_logs: env::var("FW_JSON_LOGS")
                .map(|v| parse_flag(&v))
                .unwrap_or(is_container),

            with_source_location: env::var("FW_LOG_SOURCE")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        }
    }

    /// Create configuration for one firewall mode, e.g. `bridge-inner`.
    pub fn for_mode(mode: &str) -> Self {
        let mut config = Self::from_env();
        config.service_name = format!("{}-{}", config.service_name, mode);
        config
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}
