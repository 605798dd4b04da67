//! Maps load progress onto a percentage indicator.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::progress::{LoadProgress, ProgressCallback};

/// Display surface for a [`ProgressReporter`].
pub trait ProgressIndicator: Send + Sync {
    /// Show `percent` (0 to 100) for `completed` of `total` folds.
    fn set_progress(&self, completed: usize, total: usize, percent: u8);

    /// Show that the load finished.
    fn finish(&self);
}

/// `floor(100 * completed / total)`, capped at 100. An empty run is 100%.
#[must_use]
pub fn percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let completed = completed.min(total) as u128;
    (completed * 100 / total as u128) as u8
}

/// Forwards fold progress to an indicator and signals completion exactly once.
#[derive(Debug)]
pub struct ProgressReporter<I> {
    indicator: I,
    finished: AtomicBool,
}

impl<I: ProgressIndicator> ProgressReporter<I> {
    pub fn new(indicator: I) -> Self {
        Self {
            indicator,
            finished: AtomicBool::new(false),
        }
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    /// Report `completed` of `total` folds.
    pub fn on_progress(&self, completed: usize, total: usize) {
        self.indicator
            .set_progress(completed, total, percent(completed, total));
    }

    /// Signal completion. Returns `false` if completion was already signalled.
    pub fn on_complete(&self) -> bool {
        if self.finished.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.indicator.finish();
        true
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Route a pipeline event to the indicator.
    pub fn handle(&self, event: &LoadProgress) {
        match event {
            LoadProgress::Folded {
                completed, total, ..
            } => self.on_progress(*completed, *total),
            LoadProgress::Complete { .. } => {
                self.on_complete();
            }
            _ => {}
        }
    }
}

impl<I: ProgressIndicator + 'static> ProgressReporter<I> {
    /// Create a callback that forwards events to this reporter.
    pub fn as_callback(self: &Arc<Self>) -> ProgressCallback {
        let reporter = Arc::clone(self);
        Box::new(move |event| reporter.handle(&event))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::model::Snapshot;

    #[derive(Default)]
    struct Recorder {
        updates: Mutex<Vec<(usize, usize, u8)>>,
        finishes: Mutex<usize>,
    }

    impl ProgressIndicator for Recorder {
        fn set_progress(&self, completed: usize, total: usize, percent: u8) {
            self.updates
                .lock()
                .unwrap()
                .push((completed, total, percent));
        }

        fn finish(&self) {
            *self.finishes.lock().unwrap() += 1;
        }
    }

    #[test]
    fn test_percent_floors() {
        assert_eq!(percent(0, 5), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 66);
        assert_eq!(percent(3, 3), 100);
        assert_eq!(percent(1, 7), 14);
    }

    #[test]
    fn test_percent_edge_cases() {
        assert_eq!(percent(0, 0), 100);
        assert_eq!(percent(9, 3), 100);
        assert_eq!(percent(usize::MAX, usize::MAX), 100);
    }

    #[test]
    fn test_on_progress_forwards_percent() {
        let reporter = ProgressReporter::new(Recorder::default());
        reporter.on_progress(1, 4);
        reporter.on_progress(2, 4);
        let updates = reporter.indicator().updates.lock().unwrap().clone();
        assert_eq!(updates, vec![(1, 4, 25), (2, 4, 50)]);
    }

    #[test]
    fn test_on_complete_fires_once() {
        let reporter = ProgressReporter::new(Recorder::default());
        assert!(!reporter.is_finished());
        assert!(reporter.on_complete());
        assert!(!reporter.on_complete());
        assert!(reporter.is_finished());
        assert_eq!(*reporter.indicator().finishes.lock().unwrap(), 1);
    }

    #[test]
    fn test_callback_routes_events() {
        let reporter = Arc::new(ProgressReporter::new(Recorder::default()));
        let callback = reporter.as_callback();

        callback(LoadProgress::Baseline {
            snapshot: Snapshot::default(),
        });
        callback(LoadProgress::Folded {
            completed: 1,
            total: 2,
            attached: 0,
            snapshot: Snapshot::default(),
        });
        callback(LoadProgress::Folded {
            completed: 2,
            total: 2,
            attached: 3,
            snapshot: Snapshot::default(),
        });
        let complete = LoadProgress::Complete {
            completed: 2,
            total: 2,
            events: 3,
            cancelled: false,
        };
        callback(complete.clone());
        callback(complete);

        let updates = reporter.indicator().updates.lock().unwrap().clone();
        assert_eq!(updates, vec![(1, 2, 50), (2, 2, 100)]);
        assert_eq!(*reporter.indicator().finishes.lock().unwrap(), 1);
    }
}
