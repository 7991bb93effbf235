//! Output streams owned by the multiplexer.
//!
//! - [`DocumentStream`] is the single ordered channel for one agent turn.
//! - [`RunTextStream`] carries the live text of one generation run.
//! - [`RunRegistry`] maps run ids to their text streams and publishes them to
//!   a read-only [`RunDirectory`] so placeholders can be resolved.

pub mod document;
pub mod registry;
pub mod run_text;

pub use document::{Document, DocumentStream, DocumentSubscription, DocumentUpdate};
pub use registry::{RunDirectory, RunRegistry};
pub use run_text::{RunText, RunTextStream, RunTextSubscription};

/// Errors raised by stream mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    /// The stream was already closed.
    #[error("stream is closed")]
    Closed,
}
