//! EONET CLI - command-line interface for the natural event loader.

mod commands;
mod config;
mod progress;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::Term;
use tracing_subscriber::EnvFilter;

use crate::commands::load::LoadArgs;
use crate::commands::output::OutputFormat;

#[derive(Parser)]
#[command(name = "eonet")]
#[command(version)]
#[command(about = "Browse natural events tracked by NASA's EONET")]
#[command(
    long_about = "eonet loads the Earth Observatory Natural Event Tracker catalog: every \
event category, then each category's open and closed events, fetched a few at a time \
and merged as they arrive. Events listed under several categories appear under each."
)]
#[command(after_long_help = r#"EXAMPLES
    List event categories:
        $ eonet categories

    Load the last 30 days of events with a progress bar:
        $ eonet load --days 30

    Dump every event as JSON:
        $ eonet load --with-events --output json

    Read the man page for one subcommand:
        $ eonet man load | man -l -

    Generate shell completions:
        $ eonet completions bash > ~/.local/share/bash-completion/completions/eonet

CONFIGURATION
    eonet reads configuration from:
      1. ~/.config/eonet/config.toml (or $XDG_CONFIG_HOME/eonet/config.toml)
      2. ./eonet.toml
      3. Environment variables (EONET_<SECTION>__<KEY>, e.g., EONET_LOAD__CONCURRENCY)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    EONET_API__BASE_URL         API root (default: https://eonet.gsfc.nasa.gov/api/v3)
    EONET_API__TIMEOUT_SECS     Per-request timeout (default: 30)
    EONET_LOAD__WINDOW_DAYS     Look-back window in days (default: 360)
    EONET_LOAD__CONCURRENCY     Concurrent category fetches (default: 2)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List event categories
    Categories {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Load every category's events and print a summary
    Load(LoadArgs),
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Generate man page(s)
    Man {
        /// Subcommand to document (the main page if not specified)
        command: Option<String>,
        /// Output directory for man pages (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Structured logging only when not attached to a TTY
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("eonet=info,eonet_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    // Load configuration (config file -> env vars -> defaults)
    let config = config::Config::load();

    let cli = Cli::parse();

    match cli.command {
        Commands::Categories { output } => {
            commands::categories::handle_categories(output, &config).await?;
        }
        Commands::Load(args) => {
            commands::load::handle_load(args, &config).await?;
        }
        Commands::Completions { shell } => {
            commands::meta::handle_completions(shell);
        }
        Commands::Man { command, output } => {
            commands::meta::handle_man(command, output)?;
        }
    }

    Ok(())
}
