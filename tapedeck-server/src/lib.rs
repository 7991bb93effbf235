//! HTTP transport for tapedeck documents.
//!
//! This crate serves a configured agent over HTTP: each POST runs the agent
//! once and streams the resulting document, with every run's live text, as
//! Server-Sent Events.
//!
//! # Example
//!
//! ```rust,no_run
//! use tapedeck_core::{AgentConfig, ReplayProducer};
//! use tapedeck_server::TapedeckRouter;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AgentConfig::builder()
//!     .name("demo")
//!     .producer(ReplayProducer::new(vec![]))
//!     .build()?;
//!
//! let app = TapedeckRouter::new(config)
//!     .with_stream("/api/agent")
//!     .with_cors()
//!     .build()?;
//!
//! // Serve with axum
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod router;
pub mod sse;
pub(crate) mod state;

// Re-exports
pub use error::{BuildError, ServerError};
pub use router::TapedeckRouter;
pub use sse::convert::TransportContext;
pub use sse::events::UiEvent;
pub use sse::handler::ui_events;
