//! Error types for the uplift bridge

use thiserror::Error;

/// Result type alias for uplift operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the translator or relay server
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or unsupported directive envelope
    #[error("schema error: {0}")]
    Schema(String),

    /// Response failed its shape check
    #[error("validation error: {0}")]
    Validation(String),

    /// Shared secret missing or mismatched
    #[error("authorization error: {0}")]
    Authorization(String),

    /// External control script failed to run or exited non-zero
    #[error("hardware action {action} failed: {reason}")]
    HardwareInvocation { action: String, reason: String },

    /// Directive referenced an endpoint that is not in the catalog
    #[error("unknown appliance: {0}")]
    UnknownAppliance(String),

    /// Relay server rejected a command
    #[error("relay error: {0}")]
    Relay(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
