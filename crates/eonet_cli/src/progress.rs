//! Progress display for load runs.
//!
//! This module provides two modes of progress reporting:
//! - Interactive mode (TTY): an indicatif "Download: NN%" bar
//! - Logging mode (non-TTY): structured logging using tracing
//!
//! Either mode is wrapped in the library's [`ProgressReporter`], which turns
//! fold counts into percentages and signals completion once.

mod interactive;
mod logging;

use std::sync::Arc;

use console::Term;
use eonet::sync::{LoadProgress, ProgressCallback, ProgressIndicator, ProgressReporter};

pub use interactive::InteractiveDisplay;
pub use logging::LoggingDisplay;

/// Progress display that handles both interactive and logging modes.
pub enum ProgressDisplay {
    /// Interactive progress bar for TTY.
    Interactive(InteractiveDisplay),
    /// Structured logging for non-TTY (CI, pipes).
    Logging(LoggingDisplay),
}

/// Reporter driving a [`ProgressDisplay`].
pub type LoadReporter = ProgressReporter<ProgressDisplay>;

impl ProgressDisplay {
    /// Create a new display, auto-detecting TTY mode.
    pub fn new() -> Self {
        if Term::stdout().is_term() {
            Self::Interactive(InteractiveDisplay::new())
        } else {
            Self::Logging(LoggingDisplay::new())
        }
    }

    /// Handle the non-percentage events (category counts, warnings).
    pub fn handle(&self, event: &LoadProgress) {
        match self {
            Self::Interactive(d) => d.handle(event),
            Self::Logging(d) => d.handle(event),
        }
    }

    /// Remove the bar from the terminal (interactive mode only).
    pub fn clear(&self) {
        if let Self::Interactive(d) = self {
            d.clear();
        }
    }
}

impl Default for ProgressDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressIndicator for ProgressDisplay {
    fn set_progress(&self, completed: usize, total: usize, percent: u8) {
        match self {
            Self::Interactive(d) => d.set_progress(completed, total, percent),
            Self::Logging(d) => d.set_progress(completed, total, percent),
        }
    }

    fn finish(&self) {
        match self {
            Self::Interactive(d) => d.finish(),
            Self::Logging(d) => d.finish(),
        }
    }
}

/// Convert a reporter into a callback for the loader.
///
/// Every event goes to the display first, then to the reporter for the
/// percentage and completion signal.
pub fn progress_callback(reporter: &Arc<LoadReporter>) -> ProgressCallback {
    let reporter = Arc::clone(reporter);
    Box::new(move |event| {
        reporter.indicator().handle(&event);
        reporter.handle(&event);
    })
}

#[cfg(test)]
mod tests {
    use eonet::Snapshot;

    use super::*;

    #[test]
    fn test_logging_display_completes_once() {
        let reporter = Arc::new(ProgressReporter::new(ProgressDisplay::Logging(
            LoggingDisplay::new(),
        )));
        let callback = progress_callback(&reporter);

        callback(LoadProgress::CategoriesLoaded { count: 1 });
        callback(LoadProgress::Folded {
            completed: 1,
            total: 1,
            attached: 0,
            snapshot: Snapshot::default(),
        });
        let complete = LoadProgress::Complete {
            completed: 1,
            total: 1,
            events: 0,
            cancelled: false,
        };
        callback(complete.clone());
        callback(complete);

        assert!(reporter.is_finished());
        assert!(!reporter.on_complete());
    }

    #[test]
    fn test_interactive_display_tracks_percent() {
        let display = ProgressDisplay::Interactive(InteractiveDisplay::hidden());
        display.set_progress(1, 3, 33);
        if let ProgressDisplay::Interactive(d) = &display {
            assert_eq!(d.position(), 33);
        }
        display.finish();
        display.clear();
    }
}
