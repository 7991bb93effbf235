//! Per-run live text streams.

use serde::Serialize;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use super::StreamError;

/// Accumulated text of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunText {
    /// All text received so far.
    pub text: String,
    /// Set once the run's stream is closed.
    pub done: bool,
}

/// Writer side of a run's text.
#[derive(Debug)]
pub struct RunTextStream {
    run_id: String,
    tx: watch::Sender<RunText>,
}

impl RunTextStream {
    /// Create an empty, open stream for `run_id`.
    pub fn new(run_id: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(RunText::default());
        Self {
            run_id: run_id.into(),
            tx,
        }
    }

    /// The run this stream belongs to.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Append a text delta.
    pub fn append_text(&mut self, text: &str) -> Result<(), StreamError> {
        if self.is_closed() {
            return Err(StreamError::Closed);
        }
        self.tx.send_modify(|value| value.text.push_str(text));
        Ok(())
    }

    /// Mark the stream done. Closing twice is an error.
    pub fn close(&mut self) -> Result<(), StreamError> {
        if self.is_closed() {
            return Err(StreamError::Closed);
        }
        self.tx.send_modify(|value| value.done = true);
        Ok(())
    }

    /// Whether the stream has been closed.
    pub fn is_closed(&self) -> bool {
        self.tx.borrow().done
    }

    /// Current accumulated value.
    pub fn value(&self) -> RunText {
        self.tx.borrow().clone()
    }

    /// Create a read handle. Late subscribers see the accumulated text.
    pub fn subscribe(&self) -> RunTextSubscription {
        RunTextSubscription {
            run_id: self.run_id.clone(),
            rx: self.tx.subscribe(),
        }
    }
}

/// Read side of a run's text.
#[derive(Debug, Clone)]
pub struct RunTextSubscription {
    run_id: String,
    rx: watch::Receiver<RunText>,
}

impl RunTextSubscription {
    /// The run this subscription follows.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Latest value, without waiting.
    pub fn current(&self) -> RunText {
        self.rx.borrow().clone()
    }

    /// Wait for the next change.
    ///
    /// Returns `None` once the writer is gone and no unseen value remains.
    pub async fn changed(&mut self) -> Option<RunText> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Wait until the run is closed and return its final text.
    ///
    /// If the writer is dropped without closing, the last value is returned.
    pub async fn finished(mut self) -> RunText {
        loop {
            let value = self.rx.borrow_and_update().clone();
            if value.done {
                return value;
            }
            if self.rx.changed().await.is_err() {
                return self.rx.borrow().clone();
            }
        }
    }

    /// Convert into a stream of values, starting with the current one.
    pub fn into_stream(self) -> WatchStream<RunText> {
        WatchStream::new(self.rx)
    }
}
