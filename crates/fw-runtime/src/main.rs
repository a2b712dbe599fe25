//! # Firewall Runtime
//!
//! Entry point for a firewall process. One binary serves every mode; the
//! configured `firewall_mode` selects which services are built.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (`FW_CONFIG` file, then `FW_*` overrides)
//! 2. Initialize logging, tagged with the mode
//! 3. Resolve and start the mode's service
//! 4. Run until Ctrl+C, then stop

use anyhow::{Context, Result};
use fw_runtime::{load_config, ServiceRegistry};
use fw_telemetry::{init_telemetry, TelemetryConfig};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config().context("Failed to load firewall configuration")?;
    let _telemetry = init_telemetry(TelemetryConfig::for_mode(config.mode().name()))
        .context("Failed to initialize logging")?;

    info!("===========================================");
    info!("  Corda Firewall Runtime v{}", env!("CARGO_PKG_VERSION"));
    info!("  Mode: {}", config.mode());
    info!("===========================================");

    let registry = ServiceRegistry::with_defaults();
    let service = registry
        .resolve(&config)
        .context("Failed to construct firewall service")?;
    service
        .start()
        .await
        .with_context(|| format!("Failed to start {}", service.name()))?;

    info!("Firewall is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    info!("Initiating graceful shutdown...");
    if !service.is_active() {
        warn!(service = service.name(), "Service was inactive at shutdown");
    }
    service.stop().await;
    info!("Shutdown complete");

    Ok(())
}
