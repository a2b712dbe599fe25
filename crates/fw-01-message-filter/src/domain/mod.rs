//! Domain layer for the message filter.
//!
//! Pure validation and message construction. No I/O, no locks.

pub mod errors;
pub mod outbound;
pub mod validation;

pub use errors::{BrokerError, FilterError, FilterErrorKind};
pub use outbound::OutboundMessage;
pub use validation::MessageValidator;

/// Drop reason recorded when traffic arrives while the gate is inactive.
pub const DEPENDENCIES_DOWN_REASON: &str = "Packet arrived while dependencies down.";

/// Prefix of the drop reason recorded for validation failures.
pub const VALIDATION_FAILED_PREFIX: &str = "Packet Failed validation checks: ";
