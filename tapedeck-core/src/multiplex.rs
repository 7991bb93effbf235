//! The stream multiplexer.
//!
//! [`multiplex`] spawns a drain task that owns the document and every run text
//! stream for one invocation. The caller only gets read handles back:
//!
//! ```text
//!  producer ──events──▶ drain task ──┬──▶ DocumentSubscription (append / replace / closed)
//!                          │         ├──▶ RunDirectory ──▶ RunTextSubscription per run
//!                      classify      └──▶ Completion (last payload or failure)
//! ```
//!
//! Dropping the subscription does not stop the drain; the producer is always
//! consumed to exhaustion or failure.

use futures::StreamExt;

use crate::classify::{classify, ClassifiedAction, UiMutation};
use crate::completion::{completion, Completion, CompletionResolver};
use crate::event::StreamEvent;
use crate::fragment::Fragment;
use crate::producer::{EventProducer, EventSequence, ProducerError};
use crate::stream::{DocumentStream, DocumentSubscription, RunDirectory, RunRegistry, StreamError};

/// Why a drain did not complete successfully.
#[derive(Debug, thiserror::Error)]
pub enum MultiplexError {
    /// The producer's sequence failed.
    #[error(transparent)]
    Producer(#[from] ProducerError),

    /// The drain task stopped without resolving (panic or runtime shutdown).
    #[error("drain task ended without resolving")]
    Abandoned,
}

/// Everything the caller gets back from [`multiplex`].
#[derive(Debug)]
pub struct StreamHandle {
    /// Ordered document updates.
    pub document: DocumentSubscription,
    /// Resolver for run text placeholders in the document.
    pub runs: RunDirectory,
    /// Resolves after the producer's sequence is drained.
    pub completion: Completion,
}

/// Start draining `producer` for `input` and return the read handles at once.
///
/// Must be called from within a tokio runtime.
pub fn multiplex<P>(producer: &P, input: P::Input) -> StreamHandle
where
    P: EventProducer + ?Sized,
{
    let events = producer.stream_events(input);
    let (document, subscription) = DocumentStream::new();
    let registry = RunRegistry::new();
    let runs = registry.directory();
    let (resolver, completion) = completion();

    let drain = Drain { document, registry };
    tokio::spawn(drain.run(events, resolver));

    StreamHandle {
        document: subscription,
        runs,
        completion,
    }
}

/// Single writer for one invocation's streams.
struct Drain {
    document: DocumentStream,
    registry: RunRegistry,
}

impl Drain {
    async fn run(mut self, mut events: EventSequence, resolver: CompletionResolver) {
        log::debug!("drain started");
        let mut last: Option<StreamEvent> = None;
        let mut observed = 0usize;
        let mut failure = None;

        while let Some(item) = events.next().await {
            match item {
                Ok(event) => {
                    self.apply(&event);
                    last = Some(event);
                    observed += 1;
                }
                Err(e) => {
                    log::error!("producer failed after {} events: {}", observed, e);
                    failure = Some(e);
                    break;
                }
            }
        }

        match failure {
            None => {
                resolver.resolve(last.and_then(|event| event.payload()));
                self.close();
            }
            Some(e) => {
                self.close();
                resolver.reject(MultiplexError::Producer(e));
            }
        }
        log::debug!("drain finished after {} events", observed);
    }

    fn apply(&mut self, event: &StreamEvent) {
        let result = match classify(event) {
            ClassifiedAction::Render {
                mode: UiMutation::Append,
                fragment,
            } => self.document.append(fragment),
            ClassifiedAction::Render {
                mode: UiMutation::Replace,
                fragment,
            } => self.document.replace(fragment),
            ClassifiedAction::Token { run_id, text } => self.append_token(&run_id, &text),
            ClassifiedAction::Other => Ok(()),
        };

        if let Err(e) = result {
            log::error!("dropping event {} for run {}: {}", event.event, event.run_id, e);
        }
    }

    fn append_token(&mut self, run_id: &str, text: &str) -> Result<(), StreamError> {
        let (stream, created) = self.registry.get_or_create(run_id);
        if created {
            self.document.append(Fragment::run_text(run_id))?;
        }
        stream.append_text(text)
    }

    /// Close every run stream, then the document.
    fn close(&mut self) {
        let closed = self.registry.close_all();
        if let Err(e) = self.document.close() {
            log::error!("document closed twice: {}", e);
        }
        log::debug!("closed {} run streams and the document", closed);
    }
}
