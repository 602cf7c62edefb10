//! egydead-dl main entry point
//!
//! This is the command-line interface for the egydead-dl link resolver.

use anyhow::Context;
use clap::{Parser, Subcommand};
use egydead_dl::config::{load_config_or_default, Config};
use egydead_dl::pipeline::{Action, FetchOptions, LookupOutcome, Mode};
use egydead_dl::resolver::ChromeLauncher;
use egydead_dl::{ItemOutcome, Pipeline, StdinPrompter};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// egydead-dl: direct links for a streaming catalog
///
/// Searches the catalog, walks series and seasons, lists the mirrors of a
/// title and unwraps the host redirect chains into a direct media URL.
#[derive(Parser, Debug)]
#[command(name = "egydead-dl")]
#[command(version = "1.0.0")]
#[command(about = "Resolve catalog titles to direct media links", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search or open a URL and list seasons, episodes or mirrors
    Lookup {
        /// Search text, or a catalog URL to open directly
        #[arg(value_name = "QUERY_OR_URL")]
        input: String,

        /// 1-based search result to open (prompted when omitted)
        index: Option<usize>,

        /// On a season page, list the mirrors of every episode
        #[arg(long)]
        all: bool,
    },

    /// Pick a movie or series, resolve it and print or download the file
    Fetch {
        /// Search text (prompted when omitted)
        query: Option<String>,

        /// Movie or series (prompted when omitted)
        #[arg(long, value_enum)]
        mode: Option<Mode>,

        /// Download the file or only print the direct link (prompted when omitted)
        #[arg(long, value_enum)]
        action: Option<Action>,

        /// Preferred quality, matched case-insensitively (e.g. "1080", "HD")
        #[arg(long)]
        quality: Option<String>,

        /// 1-based search result to open (prompted when omitted)
        #[arg(long)]
        index: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load(cli.config.as_deref())?;
    let launcher = Arc::new(ChromeLauncher::new(&config.browser, &config.timing));
    let mut pipeline = Pipeline::new(config, launcher, Box::new(StdinPrompter))
        .context("Failed to set up pipeline")?;

    match cli.command {
        Command::Lookup { input, index, all } => {
            let outcome = pipeline.lookup(&input, index, all).await?;
            report_lookup(&outcome);
        }
        Command::Fetch {
            query,
            mode,
            action,
            quality,
            index,
        } => {
            let outcomes = pipeline
                .fetch(FetchOptions {
                    query,
                    mode,
                    action,
                    index,
                    quality,
                })
                .await?;
            report_fetch(&outcomes);
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("egydead_dl=info,warn"),
            1 => EnvFilter::new("egydead_dl=debug,info"),
            2 => EnvFilter::new("egydead_dl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, or the built-in defaults
fn load(path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    match path {
        Some(p) => tracing::info!("Loading configuration from: {}", p.display()),
        None => tracing::debug!("No configuration file given, using defaults"),
    }

    match load_config_or_default(path) {
        Ok(config) => Ok(config),
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            Err(e.into())
        }
    }
}

fn report_lookup(outcome: &LookupOutcome) {
    if let LookupOutcome::AllEpisodes(episodes) = outcome {
        let resolved: usize = episodes
            .iter()
            .map(|(_, mirrors)| mirrors.iter().filter(|m| m.direct.is_some()).count())
            .sum();
        tracing::info!(
            "Processed {} episodes, {} direct links resolved",
            episodes.len(),
            resolved
        );
    }
}

fn report_fetch(outcomes: &[ItemOutcome]) {
    if outcomes.is_empty() {
        return;
    }

    let resolved = outcomes.iter().filter(|o| o.media().is_some()).count();
    println!("\nDone: {}/{} items resolved.", resolved, outcomes.len());
}
