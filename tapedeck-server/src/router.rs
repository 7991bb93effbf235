//! Router builder for tapedeck HTTP endpoints.

use axum::routing::post;
use axum::Router;
use tapedeck_core::AgentConfig;
use tower_http::cors::CorsLayer;

use crate::error::BuildError;
use crate::sse::handler::stream_handler;
use crate::state::AppState;

/// Builder for configuring tapedeck HTTP endpoints.
///
/// # Example
///
/// ```rust,no_run
/// use tapedeck_core::{AgentConfig, ReplayProducer};
/// use tapedeck_server::TapedeckRouter;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = AgentConfig::new(ReplayProducer::new(vec![]));
/// let app = TapedeckRouter::new(config)
///     .with_stream("/api/agent")
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct TapedeckRouter {
    config: AgentConfig,
    stream_path: Option<String>,
    cors: bool,
}

impl TapedeckRouter {
    /// Create a new router builder serving `config`.
    pub fn new(config: AgentConfig) -> Self {
        Self {
            config,
            stream_path: None,
            cors: false,
        }
    }

    /// Serve the streaming endpoint (POST, SSE response) at `path`.
    pub fn with_stream(mut self, path: impl Into<String>) -> Self {
        self.stream_path = Some(path.into());
        self
    }

    /// Allow cross-origin requests from any origin.
    ///
    /// Useful when the display is served from a different origin during
    /// development.
    pub fn with_cors(mut self) -> Self {
        self.cors = true;
        self
    }

    /// Build the router with all configured endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::NoEndpoints`] if no endpoints were configured.
    /// Call `.with_stream()` before `.build()`.
    pub fn build(self) -> Result<Router, BuildError> {
        let Some(stream_path) = self.stream_path else {
            return Err(BuildError::NoEndpoints);
        };

        log::debug!(
            "serving agent '{}' at {}",
            self.config.name(),
            stream_path
        );
        let state = AppState::new(self.config);
        let mut router = Router::new()
            .route(&stream_path, post(stream_handler))
            .with_state(state);

        if self.cors {
            router = router.layer(CorsLayer::permissive());
        }

        Ok(router)
    }

    /// Build the router and nest it under a prefix path.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::NoEndpoints`] if no endpoints were configured.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use tapedeck_core::{AgentConfig, ReplayProducer};
    /// # use tapedeck_server::TapedeckRouter;
    /// # use axum::Router;
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let config = AgentConfig::new(ReplayProducer::new(vec![]));
    /// // Nest tapedeck routes under /agent
    /// let tapedeck = TapedeckRouter::new(config)
    ///     .with_stream("/stream") // Will be at /agent/stream
    ///     .build_nested("/agent")?;
    ///
    /// let app = Router::new().merge(tapedeck);
    /// # Ok(())
    /// # }
    /// ```
    pub fn build_nested(self, prefix: impl Into<String>) -> Result<Router, BuildError> {
        Ok(Router::new().nest(&prefix.into(), self.build()?))
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
