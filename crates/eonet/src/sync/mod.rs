//! Merge-scan loading of categories and their events.
//!
//! # Module Structure
//!
//! - [`types`] - Core types: `LoadOptions`, `LoadResult`, `CancelFlag`, constants
//! - [`progress`] - Progress reporting: `LoadProgress`, `ProgressCallback`, `emit()`
//! - [`engine`] - Fold engine: `merge_scan()`, `load_snapshots()`, `filtered_events()`
//! - [`sink`] - Latest-value result stream: `SnapshotSink`, `SnapshotSubscriber`
//! - [`reporter`] - Percentage reporting: `ProgressReporter`, `ProgressIndicator`
//! - [`loader`] - Single-execution handle: `EventLoader`
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use eonet::sync::{EventLoader, LoadOptions, ProgressReporter};
//!
//! let reporter = Arc::new(ProgressReporter::new(indicator));
//! let loader = EventLoader::new(Arc::new(client), LoadOptions::default())
//!     .with_progress(reporter.as_callback());
//! let result = loader.run().await;
//! println!("{} categories loaded", result.snapshot.len());
//! ```

pub mod engine;
mod loader;
mod progress;
mod reporter;
mod sink;
mod types;

// Re-export types
pub use types::{CancelFlag, LoadOptions, LoadResult};

// Re-export constants
pub use types::{DEFAULT_FETCH_CONCURRENCY, DEFAULT_WINDOW_DAYS};

// Re-export progress types
pub use progress::{LoadProgress, ProgressCallback, ProgressFn, emit};

pub use engine::{ScanStep, StepOrigin, filtered_events, load_snapshots, merge_scan};
pub use loader::EventLoader;
pub use reporter::{ProgressIndicator, ProgressReporter, percent};
pub use sink::{SnapshotSink, SnapshotSubscriber};
