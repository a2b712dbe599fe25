//! # Corda Firewall Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs          # Message builders and wait helpers
//! └── integration/
//!     ├── filter_flows.rs      # Gate over the real adapters
//!     ├── liveness_flows.rs    # Aggregation under random toggles
//!     ├── supervisor_flows.rs  # Float supervisor composition
//!     └── runtime_flows.rs     # Registry and configuration end to end
//!
//! tests/benches/
//! └── firewall_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p fw-tests
//! cargo test -p fw-tests integration::filter_flows
//! cargo bench -p fw-tests
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod fixtures;
pub mod integration;
