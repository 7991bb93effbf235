//! The top-level document stream.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use super::StreamError;
use crate::fragment::Fragment;

/// One accepted mutation of a [`DocumentStream`], in the order it was applied.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentUpdate {
    /// A fragment was added after the current content.
    Append(Fragment),
    /// The whole content was replaced by a single fragment.
    Replace(Fragment),
    /// The stream was closed; no further updates follow.
    Closed,
}

/// Materialized content of a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    fragments: Vec<Fragment>,
    closed: bool,
}

impl Document {
    /// Apply one update.
    pub fn apply(&mut self, update: &DocumentUpdate) {
        match update {
            DocumentUpdate::Append(fragment) => self.fragments.push(fragment.clone()),
            DocumentUpdate::Replace(fragment) => {
                self.fragments.clear();
                self.fragments.push(fragment.clone());
            }
            DocumentUpdate::Closed => self.closed = true,
        }
    }

    /// Current fragments, in display order.
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Whether a close update has been applied.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Run ids of the placeholders currently in the document.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.fragments.iter().filter_map(Fragment::placeholder_run_id)
    }
}

/// Writer side of the document.
///
/// Owned by the drain task. Every accepted mutation is forwarded to the
/// paired [`DocumentSubscription`]; if the subscriber has gone away the
/// mutation is still applied locally.
#[derive(Debug)]
pub struct DocumentStream {
    content: Document,
    tx: mpsc::UnboundedSender<DocumentUpdate>,
}

impl DocumentStream {
    /// Create an empty document and its subscription.
    pub fn new() -> (Self, DocumentSubscription) {
        let (tx, rx) = mpsc::unbounded_channel();
        let stream = Self {
            content: Document::default(),
            tx,
        };
        (stream, DocumentSubscription { rx })
    }

    /// Append a fragment.
    pub fn append(&mut self, fragment: Fragment) -> Result<(), StreamError> {
        self.publish(DocumentUpdate::Append(fragment))
    }

    /// Replace the whole content with a fragment.
    pub fn replace(&mut self, fragment: Fragment) -> Result<(), StreamError> {
        self.publish(DocumentUpdate::Replace(fragment))
    }

    /// Close the stream. Closing twice is an error.
    pub fn close(&mut self) -> Result<(), StreamError> {
        self.publish(DocumentUpdate::Closed)
    }

    /// Whether the stream has been closed.
    pub fn is_closed(&self) -> bool {
        self.content.is_closed()
    }

    /// The content as applied so far.
    pub fn snapshot(&self) -> &Document {
        &self.content
    }

    fn publish(&mut self, update: DocumentUpdate) -> Result<(), StreamError> {
        if self.content.is_closed() {
            return Err(StreamError::Closed);
        }
        self.content.apply(&update);
        // Subscriber may have been dropped
        let _ = self.tx.send(update);
        Ok(())
    }
}

/// Read side of the document: an ordered stream of [`DocumentUpdate`]s.
///
/// The stream ends after [`DocumentUpdate::Closed`] (or if the writer is
/// dropped without closing).
#[derive(Debug)]
pub struct DocumentSubscription {
    rx: mpsc::UnboundedReceiver<DocumentUpdate>,
}

impl DocumentSubscription {
    /// Consume every update and return the final document.
    pub async fn collect_document(mut self) -> Document {
        let mut document = Document::default();
        while let Some(update) = self.rx.recv().await {
            document.apply(&update);
            if document.is_closed() {
                break;
            }
        }
        document
    }
}

impl Stream for DocumentSubscription {
    type Item = DocumentUpdate;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
