//! Wire events sent to display clients.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tapedeck_core::Fragment;

/// Events on the SSE stream.
///
/// Serialized with a `type` field in SCREAMING_SNAKE_CASE. A stream always
/// ends with `DOCUMENT_END` followed by exactly one of `RUN_FINISHED` or
/// `RUN_ERROR`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UiEvent {
    // ===== Document Events =====
    /// A fragment was appended to the document.
    ///
    /// A `run_text` fragment is a placeholder; its text arrives as
    /// `TEXT_DELTA` events with the same `run_id`.
    DocumentAppend { fragment: Fragment },

    /// The whole document was replaced by a fragment.
    DocumentReplace { fragment: Fragment },

    /// The document is complete; no further document or text events follow.
    DocumentEnd,

    // ===== Run Text Events =====
    /// Text to append to a run's placeholder.
    TextDelta {
        /// Run the text belongs to.
        run_id: String,
        /// Text delta to append.
        delta: String,
    },

    /// A run's text is complete.
    TextEnd { run_id: String },

    // ===== Lifecycle Events =====
    /// The agent finished; `output` is the payload of its last event.
    RunFinished {
        #[serde(skip_serializing_if = "Option::is_none")]
        output: Option<Value>,
    },

    /// The agent failed mid-run. Everything shown so far stays valid.
    RunError { message: String },
}

impl UiEvent {
    /// Whether this event ends the SSE stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, UiEvent::RunFinished { .. } | UiEvent::RunError { .. })
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
