//! Progress events emitted while a load run folds category fetches.

use crate::model::Snapshot;

/// Progress events emitted during a load run.
///
/// For a run over N categories the order is always: `CategoriesLoaded`, one
/// `Baseline`, then for each fold a `FetchedEvents` followed by `Folded`, and
/// finally a single `Complete`. `Warning` may appear anywhere.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum LoadProgress {
    /// The category list is known.
    CategoriesLoaded {
        /// Number of categories to fold into.
        count: usize,
    },

    /// Categories without any events, published before any fetch is folded.
    Baseline {
        snapshot: Snapshot,
    },

    /// A category's open and closed events arrived and have been folded.
    /// Always directly followed by the matching `Folded`.
    FetchedEvents {
        /// The category whose fetch completed.
        category_id: String,
        /// Number of events in the batch.
        count: usize,
    },

    /// A batch was folded into every category and a new snapshot published.
    Folded {
        /// Folds applied so far, including this one.
        completed: usize,
        /// Expected number of folds.
        total: usize,
        /// Events attached by this fold, summed over categories.
        attached: usize,
        snapshot: Snapshot,
    },

    /// The run finished. Emitted exactly once.
    Complete {
        completed: usize,
        total: usize,
        /// Attachments in the final snapshot.
        events: usize,
        /// Whether the run was stopped early.
        cancelled: bool,
    },

    /// Warning message (non-fatal).
    Warning {
        message: String,
    },
}

/// A borrowed progress observer.
pub type ProgressFn<'a> = dyn Fn(LoadProgress) + Send + Sync + 'a;

/// Callback for progress updates during a load run.
pub type ProgressCallback = Box<ProgressFn<'static>>;

/// Emit a progress event if a callback is provided.
///
/// # Example
///
/// ```ignore
/// use eonet::sync::{emit, LoadProgress, ProgressCallback};
///
/// fn report(on_progress: Option<&ProgressCallback>) {
///     emit(on_progress.map(|cb| cb.as_ref()), LoadProgress::CategoriesLoaded { count: 5 });
/// }
/// ```
#[inline]
pub fn emit(on_progress: Option<&ProgressFn<'_>>, event: LoadProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}
