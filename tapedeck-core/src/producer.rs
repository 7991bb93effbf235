//! Event producers: the agent side of the multiplexer.
//!
//! The agent's reasoning loop is opaque to tapedeck. It only has to expose an
//! ordered sequence of [`StreamEvent`]s through [`EventProducer`]. Two
//! adapters are provided:
//!
//! - [`ChannelProducer`] runs an async agent function that pushes events into
//!   an [`EventSink`]. Tools called by the agent share the same sink.
//! - [`ReplayProducer`] replays a recorded transcript.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::BoxStream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::conversation::AgentInput;
use crate::event::StreamEvent;
use crate::tool::ToolUi;

/// Errors raised by an event source.
#[derive(Debug, thiserror::Error)]
pub enum ProducerError {
    /// The event source failed mid-sequence.
    #[error("event source failed: {0}")]
    Failed(String),

    /// The agent aborted the run.
    #[error("agent aborted: {0}")]
    Aborted(String),

    #[error("{0}")]
    Other(String),
}

impl From<String> for ProducerError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for ProducerError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A lazy, finite, non-restartable sequence of events.
pub type EventSequence = BoxStream<'static, Result<StreamEvent, ProducerError>>;

/// Anything that can stream events for an input.
///
/// Implementations must preserve their own event order; the multiplexer
/// applies events exactly in the order they are yielded.
pub trait EventProducer: Send + Sync {
    /// Input accepted by the producer.
    type Input: Send + 'static;

    /// Start producing events for `input`.
    fn stream_events(&self, input: Self::Input) -> EventSequence;
}

impl<P: EventProducer + ?Sized> EventProducer for Arc<P> {
    type Input = P::Input;

    fn stream_events(&self, input: Self::Input) -> EventSequence {
        (**self).stream_events(input)
    }
}

/// Handle for pushing events into a [`ChannelProducer`] sequence.
///
/// Cheap to clone. Emitting after the sequence's consumer is gone is a no-op.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<Result<StreamEvent, ProducerError>>,
}

impl EventSink {
    /// Create a sink and the sequence it feeds.
    ///
    /// The sequence ends once every clone of the sink has been dropped.
    pub fn channel() -> (Self, EventSequence) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, Box::pin(UnboundedReceiverStream::new(rx)))
    }

    /// Emit an event. Returns `false` if nobody is listening anymore.
    pub fn emit(&self, event: StreamEvent) -> bool {
        self.tx.send(Ok(event)).is_ok()
    }

    /// Emit a chat model text delta for `run_id`.
    pub fn token(&self, run_id: impl Into<String>, text: impl Into<String>) -> bool {
        self.emit(StreamEvent::token(run_id, text))
    }

    /// Create a UI handle for a tool, under a freshly generated run id.
    pub fn tool_ui(&self) -> ToolUi {
        ToolUi::new(uuid::Uuid::new_v4().to_string(), self.clone())
    }

    /// Terminate the sequence with an error.
    pub fn fail(&self, error: ProducerError) {
        let _ = self.tx.send(Err(error));
    }

    /// Whether the consumer has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Producer backed by an async agent function.
///
/// Each call to [`EventProducer::stream_events`] spawns `agent(input, sink)`
/// on the current tokio runtime. If the function returns an error it becomes
/// the last item of the sequence; if it panics, the last item is
/// [`ProducerError::Aborted`].
///
/// ```rust,no_run
/// use tapedeck_core::{AgentInput, ChannelProducer, EventSink, ProducerError};
///
/// let producer: ChannelProducer<AgentInput, _> = ChannelProducer::new(|input: AgentInput, sink: EventSink| async move {
///     sink.token("run-1", format!("You said: {}", input.input));
///     Ok::<(), ProducerError>(())
/// });
/// ```
pub struct ChannelProducer<I, F> {
    agent: F,
    _input: PhantomData<fn(I)>,
}

impl<I, F> ChannelProducer<I, F> {
    /// Wrap an agent function.
    pub fn new(agent: F) -> Self {
        Self {
            agent,
            _input: PhantomData,
        }
    }
}

impl<I, F, Fut> EventProducer for ChannelProducer<I, F>
where
    I: Send + 'static,
    F: Fn(I, EventSink) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), ProducerError>> + Send + 'static,
{
    type Input = I;

    fn stream_events(&self, input: I) -> EventSequence {
        let (sink, events) = EventSink::channel();
        let run = tokio::spawn((self.agent)(input, sink.clone()));
        // Holds a sink until the agent is joined; a panic ends the sequence
        // with `Aborted`.
        tokio::spawn(async move {
            match run.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => sink.fail(e),
                Err(e) => {
                    log::error!("agent task did not finish: {}", e);
                    sink.fail(ProducerError::Aborted(e.to_string()));
                }
            }
        });
        events
    }
}

/// Replays a fixed list of events for every input.
///
/// ```
/// use tapedeck_core::{ReplayProducer, StreamEvent};
///
/// let producer = ReplayProducer::new(vec![
///     StreamEvent::token("run-a", "Hel"),
///     StreamEvent::token("run-a", "lo"),
/// ])
/// .fail_after(1, "connection reset");
/// assert_eq!(producer.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReplayProducer {
    events: Arc<Vec<StreamEvent>>,
    failure: Option<(usize, String)>,
    delay: Option<Duration>,
}

impl ReplayProducer {
    /// Replay `events` in order.
    pub fn new(events: Vec<StreamEvent>) -> Self {
        Self {
            events: Arc::new(events),
            failure: None,
            delay: None,
        }
    }

    /// Load a transcript with one JSON event per line. Blank lines are skipped.
    pub fn from_json_lines(transcript: &str) -> Result<Self, serde_json::Error> {
        let events = transcript
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str)
            .collect::<Result<Vec<StreamEvent>, _>>()?;
        Ok(Self::new(events))
    }

    /// Yield `count` events, then fail with `message`.
    pub fn fail_after(mut self, count: usize, message: impl Into<String>) -> Self {
        self.failure = Some((count, message.into()));
        self
    }

    /// Wait `delay` before each event.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the transcript is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventProducer for ReplayProducer {
    type Input = AgentInput;

    fn stream_events(&self, _input: AgentInput) -> EventSequence {
        let events = self.events.clone();
        let failure = self.failure.clone();
        let delay = self.delay;

        Box::pin(async_stream::stream! {
            let limit = failure
                .as_ref()
                .map_or(events.len(), |(count, _)| (*count).min(events.len()));

            for event in events.iter().take(limit) {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                yield Ok(event.clone());
            }

            if let Some((_, message)) = failure {
                yield Err(ProducerError::Failed(message));
            }
        })
    }
}
