//! Error types for ai-bridge

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`BridgeError`]
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Main error type for ai-bridge
#[derive(Debug, Error)]
pub enum BridgeError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration parse error
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Invalid or missing configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No API key available for a provider
    #[error("Missing API key: set {env_var} or configure token_file_path")]
    MissingApiKey { env_var: String },

    /// Content item the provider cannot represent
    #[error("{provider} provider: content type {content_type} not implemented")]
    UnsupportedContent {
        provider: String,
        content_type: String,
    },

    /// Unexpected response shape from a vendor
    #[error("{provider} protocol error: {message}")]
    Protocol { provider: String, message: String },

    /// Error event reported by the vendor inside a stream
    #[error("Error (code: {code}) - {message}")]
    Vendor { code: String, message: String },

    /// Non-success HTTP status
    #[error("API error from {provider} (HTTP {status}): {body}")]
    Api {
        provider: String,
        status: u16,
        body: String,
    },

    /// HTTP transport error (connection, timeout)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Capability not offered by a provider
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Error surfaced to the host as-is
    #[error("{0}")]
    Known(String),
}

impl BridgeError {
    pub(crate) fn protocol(provider: &str, message: impl Into<String>) -> Self {
        Self::Protocol {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}
