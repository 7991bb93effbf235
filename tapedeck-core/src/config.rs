//! Per-host agent configuration and the invocation entry point.

use std::sync::Arc;

use crate::conversation::{AgentInput, ChatRequest};
use crate::multiplex::{multiplex, StreamHandle};
use crate::producer::EventProducer;

/// Shared producer type accepted by [`AgentConfig`].
pub type SharedProducer = Arc<dyn EventProducer<Input = AgentInput>>;

/// Errors building an [`AgentConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no event producer configured. Call .producer() before .build()")]
    MissingProducer,
}

/// Everything needed to serve chat requests.
///
/// Built once by the hosting process and passed to every invocation; nothing
/// in tapedeck keeps global agent state.
///
/// ```
/// use tapedeck_core::{AgentConfig, ReplayProducer};
///
/// let config = AgentConfig::builder()
///     .name("demo")
///     .producer(ReplayProducer::new(vec![]))
///     .build()
///     .unwrap();
/// assert_eq!(config.name(), "demo");
/// ```
#[derive(Clone)]
pub struct AgentConfig {
    name: String,
    producer: SharedProducer,
}

impl AgentConfig {
    /// Start building a configuration.
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Configuration with the default name.
    pub fn new(producer: impl EventProducer<Input = AgentInput> + 'static) -> Self {
        Self {
            name: DEFAULT_AGENT_NAME.to_string(),
            producer: Arc::new(producer),
        }
    }

    /// Name used in log lines.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The configured producer.
    pub fn producer(&self) -> &SharedProducer {
        &self.producer
    }

    /// Convert `request` and start streaming the agent's output.
    ///
    /// Returns immediately; see [`multiplex`].
    pub fn invoke(&self, request: ChatRequest) -> StreamHandle {
        let input = AgentInput::from(request);
        log::debug!(
            "{}: invoking with {} history messages",
            self.name,
            input.chat_history.len()
        );
        multiplex(self.producer.as_ref(), input)
    }
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Default name for agents built without [`AgentConfigBuilder::name`].
pub const DEFAULT_AGENT_NAME: &str = "agent";

/// Builder for [`AgentConfig`].
#[derive(Default)]
pub struct AgentConfigBuilder {
    name: Option<String>,
    producer: Option<SharedProducer>,
}

impl AgentConfigBuilder {
    /// Set the agent name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the event producer.
    pub fn producer(mut self, producer: impl EventProducer<Input = AgentInput> + 'static) -> Self {
        self.producer = Some(Arc::new(producer));
        self
    }

    /// Set an already shared event producer.
    pub fn shared_producer(mut self, producer: SharedProducer) -> Self {
        self.producer = Some(producer);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<AgentConfig, ConfigError> {
        let producer = self.producer.ok_or(ConfigError::MissingProducer)?;
        Ok(AgentConfig {
            name: self.name.unwrap_or_else(|| DEFAULT_AGENT_NAME.to_string()),
            producer,
        })
    }
}

/// Invoke `config` for one chat request.
pub fn invoke(config: &AgentConfig, request: ChatRequest) -> StreamHandle {
    config.invoke(request)
}
