//! Single-resolution completion signal for a drain.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use serde_json::Value;
use tokio::sync::oneshot;

use crate::multiplex::MultiplexError;

type Outcome = Result<Option<Value>, MultiplexError>;

/// Create a linked resolver and completion future.
pub(crate) fn completion() -> (CompletionResolver, Completion) {
    let (tx, rx) = oneshot::channel();
    (CompletionResolver { tx }, Completion { rx })
}

/// Resolves once the producer's sequence has been drained.
///
/// Yields the payload of the last observed event (`None` for an empty
/// sequence), or the failure that ended the drain. If the drain task goes
/// away without resolving, yields [`MultiplexError::Abandoned`].
#[derive(Debug)]
pub struct Completion {
    rx: oneshot::Receiver<Outcome>,
}

impl Future for Completion {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => Poll::Ready(Err(MultiplexError::Abandoned)),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Write side of a [`Completion`]. Consumed on use.
#[derive(Debug)]
pub(crate) struct CompletionResolver {
    tx: oneshot::Sender<Outcome>,
}

impl CompletionResolver {
    pub(crate) fn resolve(self, payload: Option<Value>) {
        // Caller may have dropped the completion future
        let _ = self.tx.send(Ok(payload));
    }

    pub(crate) fn reject(self, error: MultiplexError) {
        let _ = self.tx.send(Err(error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::producer::ProducerError;
    use serde_json::json;

    #[tokio::test]
    async fn test_resolve_delivers_payload() {
        let (resolver, completion) = completion();
        resolver.resolve(Some(json!({"output": "done"})));
        assert_eq!(completion.await.unwrap(), Some(json!({"output": "done"})));
    }

    #[tokio::test]
    async fn test_reject_delivers_error() {
        let (resolver, completion) = completion();
        resolver.reject(MultiplexError::Producer(ProducerError::Failed("x".into())));
        assert!(matches!(
            completion.await,
            Err(MultiplexError::Producer(ProducerError::Failed(_)))
        ));
    }

    #[tokio::test]
    async fn test_dropped_resolver_is_abandoned() {
        let (resolver, completion) = completion();
        drop(resolver);
        assert!(matches!(completion.await, Err(MultiplexError::Abandoned)));
    }
}
