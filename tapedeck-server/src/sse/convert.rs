//! Conversion from multiplexer output to wire events.

use std::collections::HashMap;

use tapedeck_core::{DocumentUpdate, RunDirectory, RunText};

use super::events::UiEvent;

#[derive(Debug, Default)]
struct RunProgress {
    /// Bytes of the run's text already sent as deltas.
    forwarded: usize,
    ended: bool,
}

/// Per-request conversion state.
///
/// Run text arrives as whole snapshots (the run stream coalesces updates);
/// the context remembers how much of each run has been forwarded so only the
/// new suffix is sent.
#[derive(Debug, Default)]
pub struct TransportContext {
    runs: HashMap<String, RunProgress>,
    /// Tracked runs in placeholder order.
    order: Vec<String>,
}

impl TransportContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `run_id`. Returns `false` if it was already tracked.
    pub fn track(&mut self, run_id: &str) -> bool {
        if self.runs.contains_key(run_id) {
            return false;
        }
        self.runs.insert(run_id.to_string(), RunProgress::default());
        self.order.push(run_id.to_string());
        true
    }

    /// Whether `run_id` is tracked.
    pub fn is_tracking(&self, run_id: &str) -> bool {
        self.runs.contains_key(run_id)
    }

    /// Whether `TEXT_END` has been sent for `run_id`.
    pub fn is_ended(&self, run_id: &str) -> bool {
        self.runs.get(run_id).is_some_and(|progress| progress.ended)
    }

    /// Convert a document update.
    ///
    /// Appending a placeholder starts tracking its run. `Closed` flushes every
    /// tracked run from `runs` before `DOCUMENT_END`.
    pub fn convert_update(&mut self, update: &DocumentUpdate, runs: &RunDirectory) -> Vec<UiEvent> {
        match update {
            DocumentUpdate::Append(fragment) => {
                if let Some(run_id) = fragment.placeholder_run_id() {
                    self.track(run_id);
                }
                vec![UiEvent::DocumentAppend {
                    fragment: fragment.clone(),
                }]
            }
            DocumentUpdate::Replace(fragment) => vec![UiEvent::DocumentReplace {
                fragment: fragment.clone(),
            }],
            DocumentUpdate::Closed => {
                let mut events = self.flush(runs);
                events.push(UiEvent::DocumentEnd);
                events
            }
        }
    }

    /// Convert a run text snapshot into a delta (and `TEXT_END` once done).
    ///
    /// Snapshots for untracked or already ended runs produce nothing.
    pub fn convert_text(&mut self, run_id: &str, value: &RunText) -> Vec<UiEvent> {
        let Some(progress) = self.runs.get_mut(run_id) else {
            log::debug!("ignoring text for untracked run {}", run_id);
            return Vec::new();
        };
        if progress.ended {
            return Vec::new();
        }

        let mut events = Vec::new();
        match value.text.get(progress.forwarded..) {
            Some(delta) if !delta.is_empty() => {
                events.push(UiEvent::TextDelta {
                    run_id: run_id.to_string(),
                    delta: delta.to_string(),
                });
                progress.forwarded = value.text.len();
            }
            Some(_) => {}
            None => {
                log::warn!(
                    "run {} text shrank from {} to {} bytes",
                    run_id,
                    progress.forwarded,
                    value.text.len()
                );
            }
        }

        if value.done {
            progress.ended = true;
            events.push(UiEvent::TextEnd {
                run_id: run_id.to_string(),
            });
        }
        events
    }

    /// Send the remaining text and `TEXT_END` for every tracked run that has
    /// not ended, in placeholder order.
    pub fn flush(&mut self, runs: &RunDirectory) -> Vec<UiEvent> {
        let pending: Vec<String> = self
            .order
            .iter()
            .filter(|run_id| !self.is_ended(run_id))
            .cloned()
            .collect();

        let mut events = Vec::new();
        for run_id in pending {
            let mut value = runs
                .subscribe(&run_id)
                .map(|subscription| subscription.current())
                .unwrap_or_default();
            // Flushing ends the run on the wire even if its writer is still open.
            value.done = true;
            events.extend(self.convert_text(&run_id, &value));
        }
        events
    }
}

#[cfg(test)]
#[path = "convert_tests.rs"]
mod tests;
