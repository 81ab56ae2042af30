//! Error types for the Steam market lister

use thiserror::Error;

/// Errors that can occur when talking to Steam
#[derive(Debug, Error)]
pub enum SteamError {
    /// Network request failed
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Response body was not the JSON we expected
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Steam answered with an error status
    #[error("Steam API error: {0}")]
    ApiError(String),

    /// Timeout waiting for response
    #[error("Request timeout")]
    Timeout,
}

impl SteamError {
    /// Creates an InvalidResponse error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }
}

/// Errors raised while persisting the item ledger
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Reading or writing the ledger document failed
    #[error("Ledger I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The ledger could not be encoded
    #[error("Ledger serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// An entry with the same key is already tracked
    #[error("Duplicate ledger key: {0}")]
    DuplicateKey(String),
}

/// Errors raised while loading the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for `AppConfig`
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A credential needed by the requested command is empty
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),
}
