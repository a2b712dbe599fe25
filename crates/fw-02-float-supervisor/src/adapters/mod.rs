//! Adapters for the supervisor's outbound ports.

pub mod noop;

pub use noop::{NoOpControlChannel, NoOpListener};
