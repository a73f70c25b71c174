//! HTTP client error types.

use discoveryx_config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for HTTP client operations.
pub type Result<T> = std::result::Result<T, HttpClientError>;

/// HTTP client errors.
///
/// `Config`, `TrustStore` and `Http` (from the reqwest builder) are raised while
/// constructing a client; the rest come from individual requests.
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// Missing or malformed client settings.
    #[error("Invalid HTTP client configuration: {0}")]
    Config(#[from] ConfigError),

    /// The configured trust store could not be read.
    #[error("Failed to read trust store {}: {source}", path.display())]
    TrustStore {
        /// Resolved path of the trust store.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The operation is not available on this client.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid header name or value.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Request building error.
    #[error("Failed to build request: {0}")]
    RequestBuild(String),

    /// Response error.
    #[error("Response error: {status} - {message}")]
    Response {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// The response body is not valid text.
    #[error("Failed to decode response body: {0}")]
    Decode(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// The request task could not complete on the executor.
    #[error("Executor error: {0}")]
    Executor(String),

    /// Underlying HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl HttpClientError {
    /// Check if this error happened while constructing the client.
    pub fn is_construction(&self) -> bool {
        match self {
            Self::Config(_) | Self::TrustStore { .. } => true,
            Self::Http(e) => e.is_builder(),
            _ => false,
        }
    }

    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }

    /// Check if this is a connection error.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_connect())
    }

    /// Get the HTTP status code if this is a response error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Response { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
