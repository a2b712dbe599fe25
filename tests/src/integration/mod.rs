//! Cross-crate integration scenarios.

pub mod filter_flows;
pub mod liveness_flows;
pub mod runtime_flows;
pub mod supervisor_flows;
