//! Run id to text stream mapping.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::run_text::{RunTextStream, RunTextSubscription};

/// Insertion-ordered map from run id to its [`RunTextStream`].
///
/// Each run id is registered at most once. [`RunRegistry::close_all`] drains
/// the registry, so no stream can be closed twice.
#[derive(Debug, Default)]
pub struct RunRegistry {
    streams: Vec<RunTextStream>,
    index: HashMap<String, usize>,
    directory: RunDirectory,
}

impl RunRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view of the registered runs, shareable with callers.
    pub fn directory(&self) -> RunDirectory {
        self.directory.clone()
    }

    /// Whether `run_id` has a stream.
    pub fn contains(&self, run_id: &str) -> bool {
        self.index.contains_key(run_id)
    }

    /// Return the stream for `run_id`, creating it if needed.
    ///
    /// The boolean is `true` when the stream was created by this call. New
    /// streams are published to the directory before this returns.
    pub fn get_or_create(&mut self, run_id: &str) -> (&mut RunTextStream, bool) {
        let (idx, created) = match self.index.get(run_id) {
            Some(&idx) => (idx, false),
            None => {
                let stream = RunTextStream::new(run_id);
                self.directory.publish(stream.subscribe());
                self.streams.push(stream);
                let idx = self.streams.len() - 1;
                self.index.insert(run_id.to_string(), idx);
                log::debug!("registered text stream for run {}", run_id);
                (idx, true)
            }
        };
        (&mut self.streams[idx], created)
    }

    /// Close every registered stream in registration order.
    ///
    /// Returns the number of streams closed. The registry is empty afterwards.
    pub fn close_all(&mut self) -> usize {
        self.index.clear();
        let mut closed = 0;
        for mut stream in self.streams.drain(..) {
            match stream.close() {
                Ok(()) => closed += 1,
                Err(e) => log::error!("run {} already closed: {}", stream.run_id(), e),
            }
        }
        closed
    }

    /// Number of open streams.
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// Whether no streams are registered.
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

/// Read-only directory of run text subscriptions.
///
/// Written only by the registry that created it; callers use it to resolve
/// [`Fragment::RunText`](crate::Fragment::RunText) placeholders.
#[derive(Debug, Clone, Default)]
pub struct RunDirectory {
    inner: Arc<RwLock<DirectoryEntries>>,
}

#[derive(Debug, Default)]
struct DirectoryEntries {
    order: Vec<String>,
    runs: HashMap<String, RunTextSubscription>,
}

impl RunDirectory {
    fn publish(&self, subscription: RunTextSubscription) {
        let mut entries = self.inner.write();
        let run_id = subscription.run_id().to_string();
        if entries.runs.insert(run_id.clone(), subscription).is_none() {
            entries.order.push(run_id);
        }
    }

    /// Subscribe to the text of `run_id`, if it has been registered.
    pub fn subscribe(&self, run_id: &str) -> Option<RunTextSubscription> {
        self.inner.read().runs.get(run_id).cloned()
    }

    /// Registered run ids in registration order.
    pub fn run_ids(&self) -> Vec<String> {
        self.inner.read().order.clone()
    }

    /// Number of registered runs.
    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    /// Whether no runs have been registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_registers_once() {
        let mut registry = RunRegistry::new();

        let (_, created) = registry.get_or_create("a");
        assert!(created);
        let (_, created) = registry.get_or_create("a");
        assert!(!created);
        let (_, created) = registry.get_or_create("b");
        assert!(created);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.directory().run_ids(), vec!["a", "b"]);
    }

    #[test]
    fn test_directory_resolves_live_text() {
        let mut registry = RunRegistry::new();
        let directory = registry.directory();

        let (stream, _) = registry.get_or_create("a");
        stream.append_text("Hi").unwrap();

        let sub = directory.subscribe("a").unwrap();
        assert_eq!(sub.current().text, "Hi");
        assert!(directory.subscribe("missing").is_none());
    }

    #[test]
    fn test_close_all_closes_each_stream_once() {
        let mut registry = RunRegistry::new();
        let directory = registry.directory();
        registry.get_or_create("a");
        registry.get_or_create("b");

        assert_eq!(registry.close_all(), 2);
        assert!(registry.is_empty());
        assert!(!registry.contains("a"));
        assert_eq!(registry.close_all(), 0);

        for run_id in directory.run_ids() {
            assert!(directory.subscribe(&run_id).unwrap().current().done);
        }
    }
}
