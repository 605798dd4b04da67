//! `eonet categories`: list the event categories known to the catalog.

use eonet::{CatalogSource, EonetClient};

use crate::commands::output::{CategoryRow, OutputFormat, print_rows};
use crate::config::Config;

/// Handle the categories command.
pub(crate) async fn handle_categories(
    output: OutputFormat,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = EonetClient::new(&config.api.base_url, config.timeout())?;

    let categories = client
        .fetch_categories()
        .await
        .map_err(|e| format!("Failed to fetch categories: {}", eonet::short_error_message(&e)))?;

    tracing::debug!(count = categories.len(), "Fetched categories");

    let rows: Vec<CategoryRow> = categories.iter().map(CategoryRow::from).collect();
    print_rows(&rows, output)
}
