//! Single-execution load handle shared by progress and result consumers.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use super::engine::load_snapshots;
use super::progress::{LoadProgress, ProgressCallback, ProgressFn};
use super::sink::{SnapshotSink, SnapshotSubscriber};
use super::types::{CancelFlag, LoadOptions, LoadResult};
use crate::source::CatalogSource;

/// Runs the load pipeline at most once, however many consumers attach.
///
/// Progress observers are registered up front with
/// [`with_progress`](Self::with_progress); result consumers call
/// [`subscribe`](Self::subscribe) at any time. The first call to
/// [`run`](Self::run) spawns the pipeline onto the runtime; every call,
/// including ones made after an earlier caller gave up waiting, shares that
/// execution and its result. Dropping the loader cancels a run still in
/// progress.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use eonet::sync::{EventLoader, LoadOptions};
///
/// let loader = Arc::new(EventLoader::new(Arc::new(client), LoadOptions::default()));
/// let mut results = loader.subscribe();
/// tokio::spawn({
///     let loader = Arc::clone(&loader);
///     async move { loader.run().await }
/// });
/// while let Some(snapshot) = results.changed().await {
///     render(&snapshot);
/// }
/// ```
pub struct EventLoader<S: ?Sized> {
    state: Arc<LoadState<S>>,
    /// Taken by the call that spawns the run.
    pending: Mutex<Option<watch::Sender<Option<LoadResult>>>>,
    done: watch::Receiver<Option<LoadResult>>,
}

struct LoadState<S: ?Sized> {
    source: Arc<S>,
    options: LoadOptions,
    sink: SnapshotSink,
    observers: Vec<ProgressCallback>,
    cancel: CancelFlag,
}

impl<S> EventLoader<S>
where
    S: CatalogSource + ?Sized + 'static,
{
    pub fn new(source: Arc<S>, options: LoadOptions) -> Self {
        let (done_tx, done) = watch::channel(None);
        Self {
            state: Arc::new(LoadState {
                source,
                options,
                sink: SnapshotSink::new(),
                observers: Vec::new(),
                cancel: CancelFlag::new(),
            }),
            pending: Mutex::new(Some(done_tx)),
            done,
        }
    }

    /// Register a progress observer.
    ///
    /// Observers registered after the run has started are not called.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        match Arc::get_mut(&mut self.state) {
            Some(state) => state.observers.push(callback),
            None => tracing::warn!("Progress observer registered after the load started"),
        }
        self
    }

    pub fn options(&self) -> &LoadOptions {
        &self.state.options
    }

    /// Attach a result consumer.
    pub fn subscribe(&self) -> SnapshotSubscriber {
        self.state.sink.subscribe()
    }

    /// Stop the run. Pending fetches are aborted; completion is still reported.
    pub fn cancel(&self) {
        self.state.cancel.cancel();
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.state.cancel.clone()
    }

    /// The result, if the run has finished.
    pub fn result(&self) -> Option<LoadResult> {
        self.done.borrow().clone()
    }

    /// Run the pipeline, or wait for the run already in progress.
    ///
    /// Dropping the returned future does not stop the run.
    pub async fn run(&self) -> LoadResult {
        self.start();

        let mut done = self.done.clone();
        let finished = done
            .wait_for(Option::is_some)
            .await
            .map(|result| result.clone());
        match finished {
            Ok(result) => result.unwrap_or_default(),
            Err(_) => {
                // The run task ended without a result, so it panicked.
                tracing::warn!("Load task ended without a result");
                LoadResult {
                    snapshot: self.state.sink.latest(),
                    ..LoadResult::default()
                }
            }
        }
    }

    fn start(&self) {
        let Some(done) = self.pending.lock().ok().and_then(|mut pending| pending.take()) else {
            return;
        };

        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let result = state.execute().await;
            done.send_replace(Some(result));
        });
    }
}

impl<S: ?Sized> Drop for EventLoader<S> {
    fn drop(&mut self) {
        self.state.cancel.cancel();
    }
}

impl<S> LoadState<S>
where
    S: CatalogSource + ?Sized + 'static,
{
    async fn execute(&self) -> LoadResult {
        tracing::debug!(observers = self.observers.len(), "Starting load");
        let dispatch: &ProgressFn<'_> = &|event| self.dispatch(event);
        load_snapshots(
            Arc::clone(&self.source),
            &self.options,
            &self.sink,
            &self.cancel,
            Some(dispatch),
        )
        .await
    }

    fn dispatch(&self, event: LoadProgress) {
        if let Some((last, rest)) = self.observers.split_last() {
            for observer in rest {
                observer(event.clone());
            }
            last(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::catalog::EonetError;
    use crate::model::fixtures::{category, event};
    use crate::model::{Category, Event, EventStatus};

    struct CountingSource {
        category_calls: AtomicUsize,
        event_calls: AtomicUsize,
        delay: Duration,
    }

    impl CountingSource {
        fn new() -> Self {
            Self::with_delay(Duration::ZERO)
        }

        fn with_delay(delay: Duration) -> Self {
            Self {
                category_calls: AtomicUsize::new(0),
                event_calls: AtomicUsize::new(0),
                delay,
            }
        }
    }

    #[async_trait]
    impl CatalogSource for CountingSource {
        async fn fetch_categories(&self) -> Result<Vec<Category>, EonetError> {
            self.category_calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![category("drought"), category("floods")])
        }

        async fn fetch_events(
            &self,
            category: &Category,
            _window_days: u32,
            status: EventStatus,
        ) -> Vec<Event> {
            self.event_calls.fetch_add(1, Ordering::SeqCst);
            if self.delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(self.delay).await;
            }
            match status {
                EventStatus::Open => vec![event(
                    &format!("{}-open", category.id),
                    &[category.id.as_str()],
                    1,
                )],
                EventStatus::Closed => Vec::new(),
            }
        }
    }

    #[tokio::test]
    async fn test_run_executes_once() {
        let source = Arc::new(CountingSource::new());
        let loader = EventLoader::new(Arc::clone(&source), LoadOptions::default());

        let (first, second) = tokio::join!(loader.run(), loader.run());
        let third = loader.run().await;

        assert_eq!(source.category_calls.load(Ordering::SeqCst), 1);
        assert_eq!(source.event_calls.load(Ordering::SeqCst), 4);
        assert_eq!(first, second);
        assert_eq!(first, third);
        assert!(first.is_complete());
        assert_eq!(first.snapshot.total_events(), 2);
        assert!(loader.result().is_some());
    }

    #[tokio::test]
    async fn test_every_observer_sees_every_event() {
        let source = Arc::new(CountingSource::new());
        let first = Arc::new(Mutex::new(Vec::new()));
        let second = Arc::new(Mutex::new(Vec::new()));
        let first_clone = Arc::clone(&first);
        let second_clone = Arc::clone(&second);

        let loader = EventLoader::new(source, LoadOptions::default())
            .with_progress(Box::new(move |e| {
                first_clone.lock().unwrap().push(format!("{e:?}"))
            }))
            .with_progress(Box::new(move |e| {
                second_clone.lock().unwrap().push(format!("{e:?}"))
            }));

        loader.run().await;

        let first = first.lock().unwrap();
        let second = second.lock().unwrap();
        assert_eq!(*first, *second);
        assert!(first[0].contains("CategoriesLoaded"));
        assert!(first[1].contains("Baseline"));
        assert_eq!(first.iter().filter(|e| e.starts_with("Folded")).count(), 2);
        assert!(first.last().unwrap().contains("Complete"));
    }

    #[tokio::test]
    async fn test_subscriber_receives_final_snapshot() {
        let loader = EventLoader::new(Arc::new(CountingSource::new()), LoadOptions::default());
        let mut results = loader.subscribe();

        let (result, final_snapshot) = tokio::join!(loader.run(), results.wait_final());
        assert_eq!(final_snapshot, result.snapshot);
        assert!(results.is_complete());

        let late = loader.subscribe();
        assert_eq!(late.latest(), result.snapshot);
    }

    #[tokio::test]
    async fn test_cancel_before_run() {
        let source = Arc::new(CountingSource::new());
        let loader = EventLoader::new(Arc::clone(&source), LoadOptions::default());
        loader.cancel();

        let result = loader.run().await;
        assert!(result.cancelled);
        assert_eq!(result.completed, 0);
        assert_eq!(result.total, 0);
        assert_eq!(source.event_calls.load(Ordering::SeqCst), 0);
        assert!(loader.cancel_flag().is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_run_is_not_restarted() {
        // Each category takes 60ms: open then closed at 30ms apiece.
        let source = Arc::new(CountingSource::with_delay(Duration::from_millis(30)));
        let loader = EventLoader::new(Arc::clone(&source), LoadOptions::default());
        let mut results = loader.subscribe();

        let first = tokio::time::timeout(Duration::from_millis(40), loader.run()).await;
        assert!(first.is_err(), "first caller should give up before the run ends");
        assert!(loader.result().is_none());

        let result = loader.run().await;

        assert_eq!(source.category_calls.load(Ordering::SeqCst), 1);
        assert_eq!(source.event_calls.load(Ordering::SeqCst), 4);
        assert!(result.is_complete());
        assert_eq!(result.snapshot.total_events(), 2);

        // One baseline and two folds were published, nothing more.
        assert_eq!(results.wait_final().await, result.snapshot);
        assert_eq!(loader.subscribe().latest().total_events(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_loader_cancels_run() {
        let source = Arc::new(CountingSource::with_delay(Duration::from_millis(30)));
        let loader = EventLoader::new(Arc::clone(&source), LoadOptions::default());
        let mut results = loader.subscribe();

        let _ = tokio::time::timeout(Duration::from_millis(40), loader.run()).await;
        drop(loader);

        let final_snapshot = tokio::time::timeout(Duration::from_secs(1), results.wait_final())
            .await
            .expect("sink should be finished after the loader is dropped");
        assert!(results.is_complete());
        assert_eq!(final_snapshot.total_events(), 0);
        assert_eq!(final_snapshot.len(), 2);
    }
}
