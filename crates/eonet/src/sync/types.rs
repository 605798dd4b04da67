//! Shared load types and constants.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

use crate::model::Snapshot;

/// Default number of category event fetches in flight at once.
/// Limited to 2 to avoid overwhelming the catalog service.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 2;

/// Default look-back window for event queries, in days.
pub const DEFAULT_WINDOW_DAYS: u32 = 360;

/// Options for a load run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Only include events from the last `window_days` days.
    pub window_days: u32,
    /// Maximum concurrent event fetches. Zero is treated as one.
    pub concurrency: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }
}

/// Final state of a load run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadResult {
    /// The last snapshot emitted.
    pub snapshot: Snapshot,
    /// Number of folds applied.
    pub completed: usize,
    /// Number of categories (expected folds).
    pub total: usize,
    /// Whether the run was stopped before every fold was applied.
    pub cancelled: bool,
}

impl LoadResult {
    /// True when every category's fetch was folded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.completed == self.total
    }
}

/// Cooperative stop signal shared between a load run and its owner.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Resolve once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        loop {
            // Registered on creation, so a cancel between the check and the await is not lost.
            let notified = self.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}
