//! EONET - A client for NASA's Earth Observatory Natural Event Tracker.
//!
//! This library fetches the category catalog and each category's open and
//! closed events, folding them into a growing list of [`Snapshot`]s as the
//! fetches complete.
//!
//! # Features
//!
//! - `client` (default) - Enables the `reqwest`-backed HTTP transport and
//!   [`EonetClient::new`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use eonet::{DEFAULT_API, EonetClient, EventLoader, LoadOptions};
//!
//! let client = EonetClient::new(DEFAULT_API, Duration::from_secs(30))?;
//! let loader = EventLoader::new(Arc::new(client), LoadOptions::default());
//! let result = loader.run().await;
//!
//! for category in result.snapshot.categories() {
//!     println!("{}: {} events", category.name, category.events.len());
//! }
//! ```

pub mod catalog;
pub mod http;
pub mod model;
pub mod source;
pub mod sync;

pub use catalog::{DEFAULT_API, EonetClient, EonetError, ParseError, short_error_message};
pub use model::{Category, Event, EventStatus, Snapshot};
pub use source::CatalogSource;
pub use sync::{
    CancelFlag, EventLoader, LoadOptions, LoadProgress, LoadResult, ProgressCallback,
    ProgressIndicator, ProgressReporter, SnapshotSink, SnapshotSubscriber, load_snapshots,
};
