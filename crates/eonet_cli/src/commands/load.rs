//! `eonet load`: run the merge-scan loader and print what it found.

use std::sync::Arc;

use console::{Term, style};
use eonet::sync::{EventLoader, LoadResult, ProgressReporter};
use eonet::{EonetClient, Snapshot};

use crate::commands::output::{CategorySummary, OutputFormat, event_rows, print_rows};
use crate::config::Config;
use crate::progress::{ProgressDisplay, progress_callback};
use crate::shutdown::setup_shutdown_handler;

/// Options for the load command.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct LoadArgs {
    /// Only include events from this many days back (default from config or 360)
    #[arg(short = 'd', long)]
    days: Option<u32>,

    /// Maximum concurrent category fetches (default from config or 2)
    #[arg(short = 'c', long)]
    concurrency: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,

    /// List every event instead of per-category counts
    #[arg(short = 'e', long)]
    with_events: bool,
}

/// Handle the load command.
pub(crate) async fn handle_load(
    args: LoadArgs,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let is_tty = Term::stdout().is_term();
    let client = EonetClient::new(&config.api.base_url, config.timeout())?;
    let options = config.load_options(args.days, args.concurrency);

    tracing::debug!(
        base_url = %config.api.base_url,
        window_days = options.window_days,
        concurrency = options.concurrency,
        "Starting load"
    );

    let reporter = Arc::new(ProgressReporter::new(ProgressDisplay::new()));
    let loader = EventLoader::new(Arc::new(client), options)
        .with_progress(progress_callback(&reporter));
    setup_shutdown_handler(loader.cancel_flag());

    let mut results = loader.subscribe();
    let (result, snapshot) = tokio::join!(loader.run(), results.wait_final());

    // JSON goes to stdout for piping; drop the bar so it doesn't linger above it.
    if matches!(args.output, OutputFormat::Json) {
        reporter.indicator().clear();
    }

    render(&snapshot, args.output, args.with_events)?;

    if is_tty && !matches!(args.output, OutputFormat::Json) {
        print_footer(&result);
    }

    Ok(())
}

fn render(
    snapshot: &Snapshot,
    output: OutputFormat,
    with_events: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if with_events {
        print_rows(&event_rows(snapshot), output)
    } else {
        let rows: Vec<CategorySummary> = snapshot
            .categories()
            .iter()
            .map(CategorySummary::from)
            .collect();
        print_rows(&rows, output)
    }
}

fn print_footer(result: &LoadResult) {
    if result.cancelled {
        println!(
            "{} Cancelled after {}/{} categories, {} events loaded",
            style("⚠").yellow(),
            result.completed,
            result.total,
            result.snapshot.total_events()
        );
    } else {
        println!(
            "{} {} categories, {} events",
            style("✓").green(),
            result.total,
            result.snapshot.total_events()
        );
    }
}
