//! Common test utilities shared across test files.
//!
//! Items here may not be used by all test files, hence the module-level allow.
#![allow(dead_code)]

use futures::StreamExt;
use serde_json::Value;
use tapedeck_core::{
    Document, DocumentUpdate, Fragment, MultiplexError, RunText, StreamEvent, StreamHandle,
};

/// Everything a display would have seen for one invocation.
pub struct Observed {
    pub updates: Vec<DocumentUpdate>,
    pub document: Document,
    pub runs: Vec<(String, RunText)>,
    pub completion: Result<Option<Value>, MultiplexError>,
}

impl Observed {
    pub fn run_text(&self, run_id: &str) -> Option<&str> {
        self.runs
            .iter()
            .find(|(id, _)| id == run_id)
            .map(|(_, value)| value.text.as_str())
    }

    pub fn close_count(&self) -> usize {
        self.updates
            .iter()
            .filter(|update| matches!(update, DocumentUpdate::Closed))
            .count()
    }
}

/// Read the document to the end, checking on `Closed` that every run was
/// already finished, then collect run text and the completion.
pub async fn observe(handle: StreamHandle) -> Observed {
    let StreamHandle {
        mut document,
        runs,
        completion,
    } = handle;

    let mut updates = Vec::new();
    while let Some(update) = document.next().await {
        if update == DocumentUpdate::Closed {
            for run_id in runs.run_ids() {
                let value = runs.subscribe(&run_id).expect("registered run").current();
                assert!(value.done, "run {} still open when document closed", run_id);
            }
        }
        updates.push(update);
    }

    let mut rebuilt = Document::default();
    for update in &updates {
        rebuilt.apply(update);
    }

    let run_values = runs
        .run_ids()
        .into_iter()
        .map(|run_id| {
            let value = runs.subscribe(&run_id).expect("registered run").current();
            (run_id, value)
        })
        .collect();

    Observed {
        updates,
        document: rebuilt,
        runs: run_values,
        completion: completion.await,
    }
}

pub fn placeholder(run_id: &str) -> Fragment {
    Fragment::RunText {
        run_id: run_id.to_string(),
    }
}

pub fn loading() -> StreamEvent {
    StreamEvent::ui_update("tool-1", &Fragment::bare("GithubLoading"))
}
