//! Application state for the tapedeck server.

use tapedeck_core::AgentConfig;

/// Shared application state.
///
/// Cloned for each request handler; the configuration shares its producer.
#[derive(Clone, Debug)]
pub struct AppState {
    /// The agent every request is served with.
    pub config: AgentConfig,
}

impl AppState {
    pub fn new(config: AgentConfig) -> Self {
        Self { config }
    }
}
