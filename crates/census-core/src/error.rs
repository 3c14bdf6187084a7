//! Error types for census-mcp.

use thiserror::Error;

/// Main error type for Census operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A required argument was missing or empty. Raised before any I/O.
    #[error("{0}")]
    Validation(String),

    /// HTTP request failed before a status was received
    #[error("HTTP error: {0}")]
    Http(String),

    /// API answered with a non-200 status
    #[error("API returned status {status}")]
    Upstream { status: u16, message: String },

    /// Response body did not have the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Response was well-formed but carried no data rows
    #[error("API returned an empty result")]
    EmptyResult,

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Build an upstream error from an HTTP status and response body.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let mut message = body.into();
        if message.len() > 200 {
            let cut = (0..=200)
                .rev()
                .find(|i| message.is_char_boundary(*i))
                .unwrap_or(0);
            message.truncate(cut);
        }
        Error::Upstream { status, message }
    }

    /// Whether this error was raised by argument validation.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Whether the API answered with a non-200 status.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Error::Upstream { .. })
    }

    /// HTTP status of an upstream failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for Census operations.
pub type Result<T> = std::result::Result<T, Error>;
