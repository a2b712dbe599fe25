//! # Error Types
//!
//! Defines error types shared across firewall services.

use thiserror::Error;

/// Errors raised while parsing a legal name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LegalNameError {
    /// An attribute was not of the form `KEY=VALUE`.
    #[error("Malformed attribute: {0}")]
    MalformedAttribute(String),

    /// An attribute key outside the supported set.
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    /// The same attribute key appeared twice.
    #[error("Duplicate attribute: {0}")]
    DuplicateAttribute(String),

    /// An attribute with nothing after the `=`.
    #[error("Empty value for attribute {0}")]
    EmptyValue(String),

    /// One of O, L or C is absent.
    #[error("Missing mandatory attribute {0}")]
    MissingAttribute(&'static str),

    /// Country is not a two letter upper-case code.
    #[error("Invalid country code: {0}")]
    InvalidCountry(String),

    /// A value exceeds its maximum length.
    #[error("Attribute {attribute} exceeds {max} characters")]
    ValueTooLong { attribute: &'static str, max: usize },
}

/// Configuration errors. These are fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A float process was given high-availability settings.
    #[error("Float process should not have HA config, that is controlled via the bridge")]
    FloatWithHaConfig,

    /// The header whitelist is empty, which would reject all traffic.
    #[error("Whitelisted header set must not be empty")]
    EmptyHeaderWhitelist,

    /// A dedup cache bound is zero.
    #[error("Filter cache {field} must be greater than zero")]
    InvalidCacheBound { field: &'static str },

    /// An unrecognised firewall mode name.
    #[error("Unknown firewall mode '{0}' (expected bridge-inner, float-outer or combined)")]
    UnknownMode(String),
}
