//! Source-agnostic trait for catalog clients.
//!
//! The merge-scan pipeline only needs the two calls below, so it can run
//! against the live [`EonetClient`](crate::catalog::EonetClient) or any test
//! double.
//!
//! # Example
//!
//! ```ignore
//! use eonet::EventStatus;
//! use eonet::source::CatalogSource;
//!
//! async fn count_open<S: CatalogSource>(source: &S) -> usize {
//!     let categories = source.fetch_categories().await.unwrap_or_default();
//!     let mut total = 0;
//!     for category in &categories {
//!         total += source.fetch_events(category, 30, EventStatus::Open).await.len();
//!     }
//!     total
//! }
//! ```

use async_trait::async_trait;

use crate::catalog::EonetError;
use crate::model::{Category, Event, EventStatus};

/// A catalog of categories and their events.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the category list, without events attached.
    async fn fetch_categories(&self) -> Result<Vec<Category>, EonetError>;

    /// Fetch the events of one category with the given status, looking back
    /// `window_days` days.
    ///
    /// Implementations must degrade to an empty list on any failure.
    async fn fetch_events(
        &self,
        category: &Category,
        window_days: u32,
        status: EventStatus,
    ) -> Vec<Event>;

    /// Fetch one category's open events followed by its closed events as a
    /// single batch.
    async fn fetch_category_events(&self, category: &Category, window_days: u32) -> Vec<Event> {
        let mut events = self
            .fetch_events(category, window_days, EventStatus::Open)
            .await;
        events.extend(
            self.fetch_events(category, window_days, EventStatus::Closed)
                .await,
        );
        events
    }
}
