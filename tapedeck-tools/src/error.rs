//! Error types for the bundled tools

use tapedeck_core::ToolError;
use thiserror::Error;

/// Errors raised while a tool talks to its backing service
#[derive(Debug, Error)]
pub enum ToolsError {
    /// The HTTP client could not be constructed
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request could not be sent or timed out
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status
    #[error("HTTP error {status} from {url}")]
    Status { url: String, status: u16 },

    /// The response body did not have the expected shape
    #[error("Malformed response from {url}: {message}")]
    Decode { url: String, message: String },

    /// A lookup came back empty
    #[error("No results for {0}")]
    NotFound(String),
}

impl From<ToolsError> for ToolError {
    fn from(err: ToolsError) -> Self {
        ToolError::Custom(err.to_string())
    }
}
