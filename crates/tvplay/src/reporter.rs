//! Single-slot error channel towards the UI.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, warn};

use crate::error::{PlayerError, Severity};

/// What the UI shows in its error line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub message: String,
    pub severity: Severity,
}

impl From<&PlayerError> for ErrorReport {
    fn from(err: &PlayerError) -> Self {
        Self {
            message: err.to_string(),
            severity: err.severity(),
        }
    }
}

/// A display the reporter pushes into synchronously, e.g. a status line.
pub trait ErrorSink: Send + Sync {
    fn show(&self, report: &ErrorReport);

    fn clear(&self);
}

/// Holds at most one error at a time. The last report wins.
///
/// Cloning is cheap; all clones share the same slot. Async consumers can
/// [`subscribe`](Self::subscribe) and wait for changes, synchronous
/// displays can be attached as [`ErrorSink`]s.
#[derive(Clone)]
pub struct ErrorReporter {
    slot: Arc<watch::Sender<Option<ErrorReport>>>,
    sinks: Arc<Vec<Arc<dyn ErrorSink>>>,
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ErrorReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorReporter")
            .field("current", &*self.slot.borrow())
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl ErrorReporter {
    pub fn new() -> Self {
        let (slot, _) = watch::channel(None);
        Self {
            slot: Arc::new(slot),
            sinks: Arc::new(Vec::new()),
        }
    }

    /// Attach a display. Must be called before the reporter is shared.
    pub fn with_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        Arc::make_mut(&mut self.sinks).push(sink);
        self
    }

    pub fn report(&self, err: &PlayerError) {
        let report = ErrorReport::from(err);
        match report.severity {
            Severity::Terminal => error!(message = %report.message, "Playback error reported"),
            Severity::Warning => warn!(message = %report.message, "Playback warning reported"),
        }

        for sink in self.sinks.iter() {
            sink.show(&report);
        }
        self.slot.send_replace(Some(report));
    }

    pub fn clear(&self) {
        let cleared = self.slot.send_if_modified(|current| current.take().is_some());
        if cleared {
            debug!("Error report cleared");
        }
        for sink in self.sinks.iter() {
            sink.clear();
        }
    }

    pub fn current(&self) -> Option<ErrorReport> {
        self.slot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<ErrorReport>> {
        self.slot.subscribe()
    }
}
