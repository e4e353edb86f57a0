//! Progress reporter trait and implementations.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, Level};

/// Observer of run progress.
///
/// Reporters must not fail: the engine ignores them for correctness, and a
/// run without any observer behaves identically.
pub trait ProgressReporter: Send + Sync {
    /// Receives a progress event.
    ///
    /// # Arguments
    ///
    /// * `percent` - Progress in `0..=100`, non-decreasing within one run
    /// * `message` - Human readable status line
    fn on_progress(&self, percent: u8, message: &str);
}

/// A reporter that discards all events.
///
/// Used as the default when no observer is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn on_progress(&self, _percent: u8, _message: &str) {}
}

/// A reporter that logs events using the tracing framework.
#[derive(Debug, Clone)]
pub struct LoggingProgressReporter {
    level: Level,
}

impl Default for LoggingProgressReporter {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingProgressReporter {
    /// Creates a new logging reporter with the specified level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level logging reporter.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }

    /// Creates an info-level logging reporter.
    #[must_use]
    pub fn info() -> Self {
        Self::new(Level::INFO)
    }
}

impl ProgressReporter for LoggingProgressReporter {
    fn on_progress(&self, percent: u8, message: &str) {
        if self.level == Level::DEBUG {
            debug!(percent, "Progress: {}", message);
        } else {
            info!(percent, "Progress: {}", message);
        }
    }
}

/// One recorded progress event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Percent complete.
    pub percent: u8,
    /// Status message.
    pub message: String,
}

/// A reporter that records every event, for tests and UIs that poll.
#[derive(Debug, Default)]
pub struct CollectingProgressReporter {
    events: RwLock<Vec<ProgressEvent>>,
}

impl CollectingProgressReporter {
    /// Creates a new collecting reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.read().clone()
    }

    /// Returns only the percent values, in emission order.
    #[must_use]
    pub fn percents(&self) -> Vec<u8> {
        self.events.read().iter().map(|e| e.percent).collect()
    }

    /// Returns the last event, if any.
    #[must_use]
    pub fn last(&self) -> Option<ProgressEvent> {
        self.events.read().last().cloned()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Clears all collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

impl ProgressReporter for CollectingProgressReporter {
    fn on_progress(&self, percent: u8, message: &str) {
        self.events.write().push(ProgressEvent {
            percent,
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_noop_reporter() {
        let reporter = NoOpProgressReporter;
        reporter.on_progress(50, "halfway");
    }

    #[test]
    fn test_logging_reporter_levels() {
        LoggingProgressReporter::debug().on_progress(10, "init");
        LoggingProgressReporter::info().on_progress(100, "done");
    }

    #[test]
    fn test_collecting_reporter() {
        let reporter = CollectingProgressReporter::new();
        assert!(reporter.is_empty());

        reporter.on_progress(14, "Initializing stages");
        reporter.on_progress(28, "Stage 1/5 finished");

        assert_eq!(reporter.len(), 2);
        assert_eq!(reporter.percents(), vec![14, 28]);
        assert_eq!(reporter.last().unwrap().message, "Stage 1/5 finished");

        reporter.clear();
        assert!(reporter.last().is_none());
    }

    #[test]
    fn test_reporter_as_trait_object() {
        let collecting = Arc::new(CollectingProgressReporter::new());
        let reporter: Arc<dyn ProgressReporter> = collecting.clone();
        reporter.on_progress(100, "Review complete");
        assert_eq!(collecting.percents(), vec![100]);
    }
}
