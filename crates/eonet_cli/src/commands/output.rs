//! Table and JSON rendering for command output.

use clap::ValueEnum;
use eonet::{Category, Event, EventStatus, Snapshot};
use serde::Serialize;
use tabled::Tabled;

/// Output format for listings.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Display as a formatted table (default)
    #[default]
    Table,
    /// Display as JSON
    Json,
}

/// One row of the `categories` listing.
#[derive(Debug, Clone, Serialize, Tabled)]
pub(crate) struct CategoryRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Description")]
    pub description: String,
}

impl From<&Category> for CategoryRow {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.clone(),
            name: category.name.clone(),
            description: category.description.clone(),
        }
    }
}

/// One row of the `load` summary.
#[derive(Debug, Clone, Serialize, Tabled)]
pub(crate) struct CategorySummary {
    #[tabled(rename = "Category")]
    pub name: String,
    #[tabled(rename = "Events")]
    pub events: usize,
    #[tabled(rename = "Open")]
    pub open: usize,
    #[tabled(rename = "Closed")]
    pub closed: usize,
}

impl From<&Category> for CategorySummary {
    fn from(category: &Category) -> Self {
        let open = category
            .events
            .iter()
            .filter(|e| e.status() == EventStatus::Open)
            .count();
        Self {
            name: category.name.clone(),
            events: category.events.len(),
            open,
            closed: category.events.len() - open,
        }
    }
}

/// One row of the per-event listing.
#[derive(Debug, Clone, Serialize, Tabled)]
pub(crate) struct EventRow {
    #[tabled(rename = "Category")]
    pub category: String,
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Status")]
    pub status: EventStatus,
}

impl EventRow {
    fn new(category: &Category, event: &Event) -> Self {
        Self {
            category: category.name.clone(),
            id: event.id.clone(),
            title: event.title.clone(),
            date: event.date.format("%Y-%m-%d").to_string(),
            status: event.status(),
        }
    }
}

/// Event rows for every category, in snapshot order.
pub(crate) fn event_rows(snapshot: &Snapshot) -> Vec<EventRow> {
    snapshot
        .categories()
        .iter()
        .flat_map(|c| c.events.iter().map(move |e| EventRow::new(c, e)))
        .collect()
}

/// Print rows as a rounded table or pretty JSON.
pub(crate) fn print_rows<T: Tabled + Serialize>(
    rows: &[T],
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Table => {
            let mut table = tabled::Table::new(rows);
            table.with(tabled::settings::Style::rounded());
            println!("{}", table);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(rows)?);
        }
    }
    Ok(())
}
