//! Renderable UI fragments.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An opaque renderable unit of UI content.
///
/// Fragments are serialized with a `kind` tag so a remote client can pick the
/// component to render:
///
/// ```
/// use tapedeck_core::Fragment;
/// use serde_json::json;
///
/// let fragment = Fragment::component("Github", json!({"stars": 42}));
/// assert_eq!(
///     serde_json::to_value(&fragment).unwrap(),
///     json!({"kind": "component", "name": "Github", "props": {"stars": 42}})
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fragment {
    /// A named UI component with its props.
    Component {
        /// Component name, e.g. `GithubLoading`.
        name: String,
        /// Component props (always a JSON object).
        #[serde(default = "empty_props")]
        props: Value,
    },

    /// Plain text.
    Text {
        /// The text to display.
        text: String,
    },

    /// An inline error message rendered in place of a tool's result.
    Error {
        /// Human readable description of the failure.
        message: String,
    },

    /// Placeholder for a run's live text.
    ///
    /// Only the multiplexer creates these; the client resolves `run_id`
    /// against the run's text stream.
    RunText {
        /// Run whose text fills this placeholder.
        run_id: String,
    },
}

fn empty_props() -> Value {
    Value::Object(Map::new())
}

/// Why a render payload was rejected.
#[derive(Debug, thiserror::Error)]
pub enum FragmentError {
    #[error("payload is not a fragment: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("component name is empty")]
    EmptyComponentName,

    #[error("props of component '{0}' must be an object")]
    InvalidProps(String),

    #[error("run text placeholders cannot be rendered by producers")]
    ForeignPlaceholder,
}

impl Fragment {
    /// Create a component fragment.
    pub fn component(name: impl Into<String>, props: Value) -> Self {
        Self::Component {
            name: name.into(),
            props,
        }
    }

    /// Create a component fragment with no props.
    pub fn bare(name: impl Into<String>) -> Self {
        Self::component(name, empty_props())
    }

    /// Create a text fragment.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create an error fragment.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Create a run text placeholder.
    pub(crate) fn run_text(run_id: impl Into<String>) -> Self {
        Self::RunText {
            run_id: run_id.into(),
        }
    }

    /// Decode a producer-supplied render payload.
    ///
    /// Succeeds only for structurally well-formed fragments; placeholders are
    /// rejected since they can only originate from the multiplexer.
    pub fn from_value(value: &Value) -> Result<Self, FragmentError> {
        let fragment = Fragment::deserialize(value)?;
        fragment.validate()?;
        Ok(fragment)
    }

    fn validate(&self) -> Result<(), FragmentError> {
        match self {
            Fragment::Component { name, props } => {
                if name.trim().is_empty() {
                    return Err(FragmentError::EmptyComponentName);
                }
                if !props.is_object() {
                    return Err(FragmentError::InvalidProps(name.clone()));
                }
                Ok(())
            }
            Fragment::RunText { .. } => Err(FragmentError::ForeignPlaceholder),
            Fragment::Text { .. } | Fragment::Error { .. } => Ok(()),
        }
    }

    /// The run this fragment is a placeholder for, if any.
    pub fn placeholder_run_id(&self) -> Option<&str> {
        match self {
            Fragment::RunText { run_id } => Some(run_id),
            _ => None,
        }
    }
}
