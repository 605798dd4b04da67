//! Typed records produced by the record parser and folded by the pipeline.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Open/closed status of a natural event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Open,
    Closed,
}

impl EventStatus {
    /// Value used for the `status` query parameter.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::Open => "open",
            EventStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single observed occurrence, possibly listed under several categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    /// When the event was closed. `None` while it is still open.
    pub closed: Option<DateTime<Utc>>,
    /// Ids of every category the event is listed under.
    pub categories: Vec<String>,
    /// Timestamp used for ordering.
    pub date: DateTime<Utc>,
}

impl Event {
    #[must_use]
    pub fn status(&self) -> EventStatus {
        if self.closed.is_some() {
            EventStatus::Closed
        } else {
            EventStatus::Open
        }
    }

    /// Whether the event is listed under `category_id`.
    #[must_use]
    pub fn belongs_to(&self, category_id: &str) -> bool {
        self.categories.iter().any(|c| c == category_id)
    }
}

/// A classification of natural events together with the events folded into it so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: String,
    pub link: Option<String>,
    pub events: Vec<Event>,
}

impl Category {
    /// Create a category with no events attached.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            link: None,
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Whether an event with `event_id` is already attached.
    #[must_use]
    pub fn contains_event(&self, event_id: &str) -> bool {
        self.events.iter().any(|e| e.id == event_id)
    }
}

/// Point-in-time listing of every category with its currently known events.
///
/// Snapshots are immutable and cheap to clone; the pipeline publishes a new one
/// after every fold instead of mutating a shared value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Snapshot {
    categories: Arc<Vec<Category>>,
}

impl Snapshot {
    #[must_use]
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            categories: Arc::new(categories),
        }
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Look up a category by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Number of (category, event) attachments across the snapshot.
    ///
    /// An event listed under two categories counts twice.
    #[must_use]
    pub fn total_events(&self) -> usize {
        self.categories.iter().map(|c| c.events.len()).sum()
    }

    /// Whether both snapshots share the same allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.categories, &other.categories)
    }
}

impl From<Vec<Category>> for Snapshot {
    fn from(categories: Vec<Category>) -> Self {
        Self::new(categories)
    }
}
