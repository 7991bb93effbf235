//! Top-level error types for tapedeck
//!
//! Each component defines its own error enum next to the code that raises it.
//! This module flattens them into a single user-facing type for callers that
//! only need to know which category failed.

use thiserror::Error;

use crate::config::ConfigError;
use crate::fragment::FragmentError;
use crate::multiplex::MultiplexError;
use crate::producer::ProducerError;
use crate::stream::StreamError;
use crate::tool::ToolError;

/// Top-level error type for tapedeck operations
///
/// - [`Error::Producer`] - The agent's event sequence failed
/// - [`Error::Stream`] - A closed stream was mutated
/// - [`Error::Render`] - A render payload was not a valid fragment
/// - [`Error::Tool`] - Tool execution failed
/// - [`Error::Config`] - Fix configuration
#[derive(Debug, Error)]
pub enum Error {
    /// The producer's event sequence failed
    #[error("producer error: {0}")]
    Producer(String),

    /// A stream was used after it was closed
    #[error("stream error: {0}")]
    Stream(#[from] StreamError),

    /// Invalid render payload
    #[error("render error: {0}")]
    Render(#[from] FragmentError),

    /// Tool execution failed
    #[error("tool error: {0}")]
    Tool(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// The drain ended without delivering a result
    #[error("drain abandoned before completion")]
    Abandoned,
}

impl Error {
    /// Returns true if the producer failed
    pub fn is_producer(&self) -> bool {
        matches!(self, Self::Producer(_))
    }

    /// Returns true if this is a closed-stream error
    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }

    /// Returns true if this is a tool error
    pub fn is_tool(&self) -> bool {
        matches!(self, Self::Tool(_))
    }

    /// Returns true if this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl From<ProducerError> for Error {
    fn from(err: ProducerError) -> Self {
        Self::Producer(err.to_string())
    }
}

impl From<MultiplexError> for Error {
    fn from(err: MultiplexError) -> Self {
        match err {
            MultiplexError::Producer(e) => e.into(),
            MultiplexError::Abandoned => Self::Abandoned,
        }
    }
}

impl From<ToolError> for Error {
    fn from(err: ToolError) -> Self {
        Self::Tool(err.to_string())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type for tapedeck operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_multiplex_error() {
        let err: Error = MultiplexError::Producer(ProducerError::Failed("socket closed".into())).into();
        assert!(err.is_producer());
        assert!(err.to_string().contains("socket closed"));

        let err: Error = MultiplexError::Abandoned.into();
        assert!(matches!(err, Error::Abandoned));
    }

    #[test]
    fn test_from_component_errors() {
        let err: Error = StreamError::Closed.into();
        assert!(err.is_stream());

        let err: Error = ToolError::Custom("bad repo".into()).into();
        assert!(err.is_tool());

        let err: Error = ConfigError::MissingProducer.into();
        assert!(err.is_config());
    }
}
