//! Merge-scan load engine.
//!
//! Category event fetches run concurrently, bounded by a semaphore, and report
//! their batches over a channel to a single fold loop. The fold loop is the only
//! place category state is mutated; after each fold it publishes a fresh
//! [`Snapshot`], so readers never observe a partially folded listing.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use eonet::sync::{CancelFlag, LoadOptions, SnapshotSink, load_snapshots};
//!
//! let sink = SnapshotSink::new();
//! let result = load_snapshots(
//!     Arc::new(client),
//!     &LoadOptions::default(),
//!     &sink,
//!     &CancelFlag::new(),
//!     None,
//! ).await;
//! println!("{} events attached", result.snapshot.total_events());
//! ```

mod filter;

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;

pub use filter::filtered_events;

use super::progress::{LoadProgress, ProgressFn, emit};
use super::sink::SnapshotSink;
use super::types::{CancelFlag, LoadOptions, LoadResult};
use crate::model::{Category, Event, Snapshot};
use crate::source::CatalogSource;

/// Where a scan step came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOrigin {
    /// The initial listing, before any fold.
    Baseline,
    /// A fetch task reported a batch.
    Fetched { category_id: String, events: usize },
    /// A fetch task ended without reporting; folded as an empty batch.
    Lost,
}

/// One published state of a merge scan.
#[derive(Debug, Clone)]
pub struct ScanStep {
    pub origin: StepOrigin,
    /// Folds applied so far. Zero for the baseline.
    pub completed: usize,
    pub total: usize,
    /// Attachments made by this step.
    pub attached: usize,
    pub snapshot: Snapshot,
}

struct FetchedBatch {
    category_id: String,
    events: Vec<Event>,
}

/// Fetch every category's events concurrently and fold the batches in
/// completion order.
///
/// `on_step` is called once with the baseline and then exactly once per
/// category, with `completed` increasing by one each time. At most
/// `concurrency` calls to `fetch` are in flight at once.
///
/// When `cancel` fires, in-flight fetches are aborted and no further steps are
/// reported. The returned result carries the last published snapshot.
pub async fn merge_scan<F, Fut>(
    categories: Vec<Category>,
    concurrency: usize,
    fetch: F,
    cancel: &CancelFlag,
    mut on_step: impl FnMut(ScanStep),
) -> LoadResult
where
    F: Fn(Category) -> Fut,
    Fut: Future<Output = Vec<Event>> + Send + 'static,
{
    let total = categories.len();
    let mut state = categories;
    let mut snapshot = Snapshot::new(state.clone());

    on_step(ScanStep {
        origin: StepOrigin::Baseline,
        completed: 0,
        total,
        attached: 0,
        snapshot: snapshot.clone(),
    });

    if total == 0 || cancel.is_cancelled() {
        return LoadResult {
            snapshot,
            completed: 0,
            total,
            cancelled: cancel.is_cancelled(),
        };
    }

    let concurrency = concurrency.clamp(1, total);
    let semaphore = Arc::new(Semaphore::new(concurrency));
    // One slot per category, so a finished fetch never waits on the fold loop.
    let (batch_tx, mut batch_rx) = mpsc::channel::<FetchedBatch>(total);

    // Dropping the set aborts every fetch still running, so an abandoned scan
    // releases its permits and connections.
    let mut fetches = JoinSet::new();
    for category in &state {
        let semaphore = Arc::clone(&semaphore);
        let batch_tx = batch_tx.clone();
        let category_id = category.id.clone();
        let request = fetch(category.clone());

        fetches.spawn(async move {
            let events = match semaphore.acquire().await {
                Ok(_permit) => request.await,
                Err(_) => {
                    tracing::warn!(category = %category_id, "Semaphore closed unexpectedly");
                    Vec::new()
                }
            };
            let _ = batch_tx
                .send(FetchedBatch {
                    category_id,
                    events,
                })
                .await;
        });
    }

    // Drop the original sender so the channel closes once every task is done.
    drop(batch_tx);

    let mut completed = 0;
    let mut cancelled = false;
    while completed < total {
        let received = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                cancelled = true;
                break;
            }
            batch = batch_rx.recv() => batch,
        };

        let (origin, batch) = match received {
            Some(FetchedBatch {
                category_id,
                events,
            }) => (
                StepOrigin::Fetched {
                    category_id,
                    events: events.len(),
                },
                events,
            ),
            None => (StepOrigin::Lost, Vec::new()),
        };

        let attached = filter::fold_batch(&mut state, &batch);
        completed += 1;
        snapshot = Snapshot::new(state.clone());

        on_step(ScanStep {
            origin,
            completed,
            total,
            attached,
            snapshot: snapshot.clone(),
        });
    }

    fetches.abort_all();

    LoadResult {
        snapshot,
        completed,
        total,
        cancelled,
    }
}

/// Load every category and fold in its open and closed events.
///
/// Publishes the baseline and every folded snapshot to `sink`, marks the sink
/// complete when done, and reports [`LoadProgress`] events to `on_progress`.
/// A failed category fetch is reported as a warning and produces an empty
/// result rather than an error.
#[tracing::instrument(
    skip_all,
    fields(window_days = options.window_days, concurrency = options.concurrency)
)]
pub async fn load_snapshots<S>(
    source: Arc<S>,
    options: &LoadOptions,
    sink: &SnapshotSink,
    cancel: &CancelFlag,
    on_progress: Option<&ProgressFn<'_>>,
) -> LoadResult
where
    S: CatalogSource + ?Sized + 'static,
{
    let fetched = tokio::select! {
        biased;
        _ = cancel.cancelled() => Ok(Vec::new()),
        fetched = source.fetch_categories() => fetched,
    };
    let categories = match fetched {
        Ok(categories) => categories,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load categories");
            emit(
                on_progress,
                LoadProgress::Warning {
                    message: format!("Failed to load categories: {e}"),
                },
            );
            Vec::new()
        }
    };

    tracing::debug!(count = categories.len(), "Categories loaded");
    emit(
        on_progress,
        LoadProgress::CategoriesLoaded {
            count: categories.len(),
        },
    );

    let window_days = options.window_days;
    let fetch = |category: Category| {
        let source = Arc::clone(&source);
        async move { source.fetch_category_events(&category, window_days).await }
    };

    let result = merge_scan(
        categories,
        options.concurrency,
        fetch,
        cancel,
        |step| {
            sink.publish(step.snapshot.clone());
            match step.origin {
                StepOrigin::Baseline => {
                    emit(
                        on_progress,
                        LoadProgress::Baseline {
                            snapshot: step.snapshot,
                        },
                    );
                    return;
                }
                StepOrigin::Fetched {
                    category_id,
                    events,
                } => {
                    tracing::debug!(category = %category_id, events, attached = step.attached, "Folded batch");
                    emit(
                        on_progress,
                        LoadProgress::FetchedEvents {
                            category_id,
                            count: events,
                        },
                    );
                }
                StepOrigin::Lost => {
                    tracing::warn!("Fetch task ended without reporting events");
                    emit(
                        on_progress,
                        LoadProgress::Warning {
                            message: "A category fetch ended without reporting events".to_string(),
                        },
                    );
                }
            }
            emit(
                on_progress,
                LoadProgress::Folded {
                    completed: step.completed,
                    total: step.total,
                    attached: step.attached,
                    snapshot: step.snapshot,
                },
            );
        },
    )
    .await;

    sink.finish();

    if result.cancelled {
        tracing::info!(
            completed = result.completed,
            total = result.total,
            "Load cancelled"
        );
    } else {
        tracing::info!(
            categories = result.total,
            events = result.snapshot.total_events(),
            "Load complete"
        );
    }

    emit(
        on_progress,
        LoadProgress::Complete {
            completed: result.completed,
            total: result.total,
            events: result.snapshot.total_events(),
            cancelled: result.cancelled,
        },
    );

    result
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::model::fixtures::{category, event};

    fn record_steps() -> (Arc<Mutex<Vec<ScanStep>>>, impl FnMut(ScanStep)) {
        let steps = Arc::new(Mutex::new(Vec::new()));
        let steps_clone = Arc::clone(&steps);
        (steps, move |step| steps_clone.lock().unwrap().push(step))
    }

    #[tokio::test]
    async fn test_merge_scan_emits_baseline_then_one_step_per_category() {
        let categories = vec![category("drought"), category("floods"), category("snow")];
        let (steps, on_step) = record_steps();

        let result = merge_scan(
            categories,
            2,
            |c: Category| async move { vec![event(&format!("{}-1", c.id), &[c.id.as_str()], 1)] },
            &CancelFlag::new(),
            on_step,
        )
        .await;

        let steps = steps.lock().unwrap();
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[0].origin, StepOrigin::Baseline);
        assert_eq!(steps[0].snapshot.total_events(), 0);
        let completed: Vec<usize> = steps.iter().map(|s| s.completed).collect();
        assert_eq!(completed, vec![0, 1, 2, 3]);
        assert!(steps.iter().all(|s| s.total == 3));

        assert!(result.is_complete());
        assert_eq!(result.snapshot.total_events(), 3);
        assert!(result.snapshot.ptr_eq(&steps[3].snapshot));
    }

    #[tokio::test]
    async fn test_merge_scan_snapshots_grow_monotonically() {
        let categories = vec![category("drought"), category("floods")];
        let (steps, on_step) = record_steps();

        merge_scan(
            categories,
            1,
            |c: Category| async move {
                vec![
                    event("shared", &["drought", "floods"], 2),
                    event(&format!("{}-own", c.id), &[c.id.as_str()], 1),
                ]
            },
            &CancelFlag::new(),
            on_step,
        )
        .await;

        let steps = steps.lock().unwrap();
        for pair in steps.windows(2) {
            for (before, after) in pair[0]
                .snapshot
                .categories()
                .iter()
                .zip(pair[1].snapshot.categories())
            {
                assert!(after.events.len() >= before.events.len());
                assert_eq!(after.events[..before.events.len()], before.events[..]);
            }
        }

        let last = &steps.last().unwrap().snapshot;
        let drought = last.get("drought").unwrap();
        assert_eq!(drought.events.len(), 2);
        assert_eq!(
            drought.events.iter().filter(|e| e.id == "shared").count(),
            1
        );
    }

    #[tokio::test]
    async fn test_merge_scan_empty_categories() {
        let (steps, on_step) = record_steps();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);

        let result = merge_scan(
            Vec::new(),
            2,
            move |_c: Category| {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                async { Vec::new() }
            },
            &CancelFlag::new(),
            on_step,
        )
        .await;

        assert_eq!(steps.lock().unwrap().len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(result.is_complete());
        assert!(result.snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_merge_scan_zero_concurrency_still_progresses() {
        let (steps, on_step) = record_steps();
        let result = merge_scan(
            vec![category("drought"), category("floods")],
            0,
            |_c: Category| async { Vec::new() },
            &CancelFlag::new(),
            on_step,
        )
        .await;

        assert_eq!(steps.lock().unwrap().len(), 3);
        assert_eq!(result.completed, 2);
    }

    #[tokio::test]
    async fn test_merge_scan_folds_panicked_fetch_as_empty() {
        let (steps, on_step) = record_steps();

        let result = merge_scan(
            vec![category("drought"), category("floods")],
            2,
            |c: Category| async move {
                if c.id == "floods" {
                    panic!("fetch exploded");
                }
                vec![event("d1", &["drought"], 1)]
            },
            &CancelFlag::new(),
            on_step,
        )
        .await;

        let steps = steps.lock().unwrap();
        assert_eq!(steps.len(), 3);
        assert!(steps.iter().any(|s| s.origin == StepOrigin::Lost));
        assert_eq!(result.completed, 2);
        assert!(result.is_complete());
        assert_eq!(result.snapshot.total_events(), 1);
    }

    #[tokio::test]
    async fn test_merge_scan_cancel_stops_folding() {
        let cancel = CancelFlag::new();
        let (steps, on_step) = record_steps();

        let scan = merge_scan(
            vec![category("drought"), category("floods")],
            2,
            |_c: Category| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Vec::new()
            },
            &cancel,
            on_step,
        );

        let canceller = cancel.clone();
        let (result, ()) = tokio::join!(scan, async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        assert!(result.cancelled);
        assert_eq!(result.completed, 0);
        assert!(!result.is_complete());
        assert_eq!(steps.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_merge_scan_already_cancelled_skips_fetches() {
        let cancel = CancelFlag::new();
        cancel.cancel();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);

        let result = merge_scan(
            vec![category("drought")],
            2,
            move |_c: Category| {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                async { Vec::new() }
            },
            &cancel,
            |_step| {},
        )
        .await;

        assert!(result.cancelled);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_scan_aborts_fetches() {
        let cancel = CancelFlag::new();
        let finished = Arc::new(AtomicUsize::new(0));
        let finished_clone = Arc::clone(&finished);

        let scan = merge_scan(
            vec![
                category("drought"),
                category("floods"),
                category("snow"),
                category("wildfires"),
            ],
            2,
            move |_c: Category| {
                let finished = Arc::clone(&finished_clone);
                async move {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    finished.fetch_add(1, Ordering::SeqCst);
                    Vec::new()
                }
            },
            &cancel,
            |_step| {},
        );

        let abandoned = tokio::time::timeout(Duration::from_millis(5), scan).await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }
}
