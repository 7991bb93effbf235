//! Events observed from an agent's event sequence.
//!
//! A [`StreamEvent`] is the raw record a producer emits. The multiplexer never
//! inspects these fields directly; it hands each event to
//! [`classify`](crate::classify::classify) and acts on the decoded action.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::fragment::Fragment;

/// Event tag for an incremental chat model delta.
pub const CHAT_MODEL_STREAM: &str = "on_chat_model_stream";

/// Event tag used for side outputs (UI yields are dispatched as chain ends).
pub const CHAIN_END: &str = "on_chain_end";

/// Source name that marks an event as a UI render signal.
pub const YIELD_UI_NAME: &str = "__yield_ui__";

/// One record from a producer's event sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    /// Discriminator tag, e.g. `on_chat_model_stream`.
    pub event: String,
    /// Logical source name (tool, chain or model that produced the event).
    #[serde(default)]
    pub name: String,
    /// Identifier of the run that produced the event.
    #[serde(default)]
    pub run_id: String,
    /// Event body.
    #[serde(default)]
    pub data: EventData,
}

/// Body of a [`StreamEvent`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    /// Incremental delta, present on streaming events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk: Option<Value>,
    /// Final or side output of the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
}

impl StreamEvent {
    /// Create an event with an empty body.
    pub fn new(event: impl Into<String>, name: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            name: name.into(),
            run_id: run_id.into(),
            data: EventData::default(),
        }
    }

    /// A chat model delta carrying a text token.
    pub fn token(run_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(CHAT_MODEL_STREAM, "chat_model", run_id).with_chunk(json!({ "text": text.into() }))
    }

    /// A UI render signal that appends `fragment` to the document.
    pub fn ui_append(run_id: impl Into<String>, fragment: &Fragment) -> Self {
        Self::ui_yield(run_id, "append", fragment)
    }

    /// A UI render signal that replaces the document with `fragment`.
    pub fn ui_update(run_id: impl Into<String>, fragment: &Fragment) -> Self {
        Self::ui_yield(run_id, "update", fragment)
    }

    fn ui_yield(run_id: impl Into<String>, mode: &str, fragment: &Fragment) -> Self {
        Self::new(CHAIN_END, YIELD_UI_NAME, run_id).with_output(json!({
            "type": mode,
            "value": fragment,
        }))
    }

    /// Attach an incremental delta.
    pub fn with_chunk(mut self, chunk: Value) -> Self {
        self.data.chunk = Some(chunk);
        self
    }

    /// Attach a final or side output.
    pub fn with_output(mut self, output: Value) -> Self {
        self.data.output = Some(output);
        self
    }

    /// The value handed to the caller when this is the last event of a drain.
    pub fn payload(&self) -> Option<Value> {
        self.data.output.clone()
    }
}
