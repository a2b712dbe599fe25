//! Supervisor error types.

use shared_types::ConfigError;
use thiserror::Error;

/// Errors raised while assembling a supervisor. All are fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SupervisorError {
    #[error("Invalid supervisor configuration: {0}")]
    Config(#[from] ConfigError),
}
