//! Test utilities for tapedeck-core.
//!
//! Helpers for scripting event sequences and draining a [`StreamHandle`]
//! without writing the subscription plumbing in every test.
//!
//! Enable with the `test-utils` feature:
//!
//! ```toml
//! [dev-dependencies]
//! tapedeck-core = { version = "...", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```rust
//! use tapedeck_core::test_utils::{drain, EventScript};
//! use tapedeck_core::{multiplex, AgentInput};
//!
//! # async fn example() {
//! let producer = EventScript::new()
//!     .append_text("loading")
//!     .token("run-a", "Hi")
//!     .into_producer();
//!
//! let drained = drain(multiplex(&producer, AgentInput::new("hi"))).await;
//! assert_eq!(drained.run_text("run-a"), Some("Hi"));
//! # }
//! ```

use serde_json::Value;

use crate::event::StreamEvent;
use crate::fragment::Fragment;
use crate::multiplex::{MultiplexError, StreamHandle};
use crate::producer::ReplayProducer;
use crate::stream::{Document, DocumentUpdate, RunText};

/// Builder for scripted event sequences.
#[derive(Debug, Clone, Default)]
pub struct EventScript {
    events: Vec<StreamEvent>,
}

impl EventScript {
    /// An empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text token for `run_id`.
    pub fn token(mut self, run_id: &str, text: &str) -> Self {
        self.events.push(StreamEvent::token(run_id, text));
        self
    }

    /// Add a render signal appending `fragment`.
    pub fn append(mut self, fragment: Fragment) -> Self {
        self.events.push(StreamEvent::ui_append("tool", &fragment));
        self
    }

    /// Add a render signal replacing the document with `fragment`.
    pub fn replace(mut self, fragment: Fragment) -> Self {
        self.events.push(StreamEvent::ui_update("tool", &fragment));
        self
    }

    /// Shorthand for appending a text fragment.
    pub fn append_text(self, text: &str) -> Self {
        self.append(Fragment::text(text))
    }

    /// Shorthand for replacing with a text fragment.
    pub fn replace_text(self, text: &str) -> Self {
        self.replace(Fragment::text(text))
    }

    /// Add an arbitrary event.
    pub fn event(mut self, event: StreamEvent) -> Self {
        self.events.push(event);
        self
    }

    /// The scripted events.
    pub fn events(&self) -> &[StreamEvent] {
        &self.events
    }

    /// Replay the script.
    pub fn into_producer(self) -> ReplayProducer {
        ReplayProducer::new(self.events)
    }
}

/// Everything observed while draining a handle.
#[derive(Debug)]
pub struct Drained {
    /// Document updates in arrival order.
    pub updates: Vec<DocumentUpdate>,
    /// The document rebuilt from `updates`.
    pub document: Document,
    /// Final text of every run, in registration order.
    pub runs: Vec<(String, RunText)>,
    /// Outcome of the completion signal.
    pub completion: Result<Option<Value>, MultiplexError>,
}

impl Drained {
    /// Final text of `run_id`, if the run was registered.
    pub fn run_text(&self, run_id: &str) -> Option<&str> {
        self.runs
            .iter()
            .find(|(id, _)| id == run_id)
            .map(|(_, value)| value.text.as_str())
    }

    /// Number of `Closed` updates observed.
    pub fn close_count(&self) -> usize {
        self.updates
            .iter()
            .filter(|update| matches!(update, DocumentUpdate::Closed))
            .count()
    }
}

/// Consume a handle to the end.
///
/// Reads the document until its sender goes away, then snapshots every run and
/// awaits the completion signal.
pub async fn drain(handle: StreamHandle) -> Drained {
    use futures::StreamExt;

    let StreamHandle {
        document: subscription,
        runs: directory,
        completion,
    } = handle;

    let updates: Vec<DocumentUpdate> = subscription.collect().await;
    let mut document = Document::default();
    for update in &updates {
        document.apply(update);
    }

    let runs = directory
        .run_ids()
        .into_iter()
        .filter_map(|run_id| {
            let value = directory.subscribe(&run_id)?.current();
            Some((run_id, value))
        })
        .collect();

    Drained {
        updates,
        document,
        runs,
        completion: completion.await,
    }
}
