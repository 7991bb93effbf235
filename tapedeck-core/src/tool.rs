use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::StreamEvent;
use crate::fragment::Fragment;
use crate::producer::EventSink;
use crate::stream::StreamError;

/// Result returned to the agent after a tool ran.
///
/// The agent only ever sees text; JSON results are rendered compactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ToolOutput {
    /// Plain text response
    Text(String),

    /// Structured JSON data
    Json(Value),
}

impl ToolOutput {
    /// Create a JSON result from any serializable type
    pub fn json<T: Serialize>(value: T) -> Result<Self, serde_json::Error> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// Create a text result from a string
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Text handed back to the agent
    pub fn as_text(&self) -> String {
        match self {
            ToolOutput::Text(s) => s.clone(),
            ToolOutput::Json(v) => v.to_string(),
        }
    }
}

impl From<String> for ToolOutput {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for ToolOutput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Errors that can occur during tool execution
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("UI stream error: {0}")]
    Ui(#[from] StreamError),

    #[error("{0}")]
    Custom(String),
}

impl From<String> for ToolError {
    fn from(s: String) -> Self {
        Self::Custom(s)
    }
}

impl From<&str> for ToolError {
    fn from(s: &str) -> Self {
        Self::Custom(s.to_string())
    }
}

/// A tool's handle onto the document.
///
/// Each mutation is emitted as a UI render signal on the agent's event
/// sequence, so it reaches the document in order with the agent's own
/// tokens. A tool issues one loading [`update`](Self::update) and exactly one
/// terminal [`done`](Self::done); anything after `done` is rejected.
#[derive(Debug)]
pub struct ToolUi {
    run_id: String,
    sink: EventSink,
    finished: AtomicBool,
}

impl ToolUi {
    /// Create a handle that emits render signals for `run_id` into `sink`.
    pub fn new(run_id: impl Into<String>, sink: EventSink) -> Self {
        Self {
            run_id: run_id.into(),
            sink,
            finished: AtomicBool::new(false),
        }
    }

    /// Run id the render signals are tagged with.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Show an intermediate fragment (typically a loading state).
    pub fn update(&self, fragment: Fragment) -> Result<(), StreamError> {
        if self.is_done() {
            return Err(StreamError::Closed);
        }
        self.sink.emit(StreamEvent::ui_update(&self.run_id, &fragment));
        Ok(())
    }

    /// Show the terminal fragment. Can only succeed once.
    pub fn done(&self, fragment: Fragment) -> Result<(), StreamError> {
        if self.finished.swap(true, Ordering::SeqCst) {
            return Err(StreamError::Closed);
        }
        self.sink.emit(StreamEvent::ui_update(&self.run_id, &fragment));
        Ok(())
    }

    /// Whether the terminal fragment has been sent.
    pub fn is_done(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

/// Trait for implementing tools that render UI while they run.
///
/// Tools define an input type with `#[derive(Deserialize, JsonSchema)]`; the
/// JSON schema handed to the model is generated from it.
///
/// ```rust
/// use tapedeck_core::{Fragment, Tool, ToolError, ToolOutput, ToolUi};
/// use schemars::JsonSchema;
/// use serde::Deserialize;
/// use serde_json::json;
///
/// #[derive(Deserialize, JsonSchema)]
/// struct GreetInput {
///     name: String,
/// }
///
/// struct GreetTool;
///
/// impl Tool for GreetTool {
///     type Input = GreetInput;
///
///     fn name(&self) -> &str { "greet" }
///     fn description(&self) -> &str { "Greet someone on screen" }
///
///     async fn execute(&self, input: GreetInput, ui: &ToolUi) -> Result<ToolOutput, ToolError> {
///         ui.update(Fragment::bare("GreetingLoading"))?;
///         ui.done(Fragment::component("Greeting", json!({"name": input.name})))?;
///         Ok(format!("Greeted {}", input.name).into())
///     }
/// }
/// ```
pub trait Tool: Send + Sync {
    /// The input type for this tool. Must implement `Deserialize` and `JsonSchema`.
    type Input: DeserializeOwned + JsonSchema + Send;

    /// The name of the tool (e.g., "github_repo")
    fn name(&self) -> &str;

    /// A description of what the tool does
    fn description(&self) -> &str;

    /// Execute the tool with typed input, rendering through `ui`
    fn execute(
        &self,
        input: Self::Input,
        ui: &ToolUi,
    ) -> impl Future<Output = Result<ToolOutput, ToolError>> + Send;

    /// Get the JSON schema for this tool's input.
    fn input_schema(&self) -> Value {
        let schema = schemars::schema_for!(Self::Input);
        serde_json::to_value(schema).unwrap_or_default()
    }
}

/// Object-safe trait for dynamic tool dispatch.
///
/// Users should implement `Tool` instead and use `box_tool()` to convert.
pub trait DynTool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn input_schema(&self) -> Value;

    /// Run the tool on raw JSON input and return the text for the agent.
    ///
    /// Never fails: invalid input and execution errors are rendered as an
    /// error fragment and described in the returned text.
    fn execute_raw<'a>(
        &'a self,
        input: Value,
        ui: &'a ToolUi,
    ) -> Pin<Box<dyn Future<Output = String> + Send + 'a>>;
}

/// Convert a `Tool` into a type-erased `Box<dyn DynTool>` for storage in collections.
pub fn box_tool<T: Tool + 'static>(tool: T) -> Box<dyn DynTool> {
    Box::new(ToolWrapper(tool))
}

/// Create a `Vec<Box<dyn DynTool>>` from heterogeneous tool types.
///
/// ```ignore
/// let tools = box_tools![GithubRepoTool::new(&config), InvoiceTool::new(&config)];
/// ```
#[macro_export]
macro_rules! box_tools {
    ($($tool:expr),* $(,)?) => {
        vec![$($crate::tool::box_tool($tool)),*]
    };
}

/// Run `tool` with a fresh UI handle on `sink`.
pub async fn run_tool(tool: &dyn DynTool, input: Value, sink: &EventSink) -> String {
    let ui = sink.tool_ui();
    tool.execute_raw(input, &ui).await
}

/// Internal wrapper that implements DynTool for any Tool
struct ToolWrapper<T>(T);

impl<T: Tool + 'static> DynTool for ToolWrapper<T> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn description(&self) -> &str {
        self.0.description()
    }

    fn input_schema(&self) -> Value {
        self.0.input_schema()
    }

    fn execute_raw<'a>(
        &'a self,
        input: Value,
        ui: &'a ToolUi,
    ) -> Pin<Box<dyn Future<Output = String> + Send + 'a>> {
        Box::pin(async move {
            let result = match serde_json::from_value::<T::Input>(input) {
                Ok(typed_input) => self.0.execute(typed_input, ui).await,
                Err(e) => Err(ToolError::InvalidInput(e.to_string())),
            };

            match result {
                Ok(output) => {
                    if !ui.is_done() {
                        log::warn!("tool {} returned without a final fragment", self.0.name());
                    }
                    output.as_text()
                }
                Err(e) => {
                    let message = format!("Error running {}: {}", self.0.name(), e);
                    if ui.done(Fragment::error(&message)).is_err() {
                        log::warn!("tool {} failed after its final fragment: {}", self.0.name(), e);
                    }
                    message
                }
            }
        })
    }
}
