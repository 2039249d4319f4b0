//! Cinerank main entry point
//!
//! Command-line interface for the Cinerank chart harvester.

use cinerank::config::load_config;
use cinerank::pipeline::run_pipeline;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Cinerank: a ranked movie-chart harvester
///
/// Cinerank drives a remote browser through a JavaScript-rendered movie
/// chart, collects the ranked entries and their top-billed cast, and upserts
/// them into a SQLite database while recording each run's outcome.
#[derive(Parser, Debug)]
#[command(name = "cinerank")]
#[command(version = "0.1.0")]
#[command(about = "A ranked movie-chart harvester", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without running
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    match run_pipeline(&config).await {
        Ok(outcome) => {
            tracing::info!(
                "Run {} complete: {} movie rows, {} cast rows",
                outcome.run_id,
                outcome.movies_written,
                outcome.cast_written
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            std::process::exit(1);
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("cinerank=info,warn"),
            1 => EnvFilter::new("cinerank=debug,info"),
            2 => EnvFilter::new("cinerank=trace,debug"),
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

/// Handles the --dry-run mode: prints the effective configuration
fn handle_dry_run(config: &cinerank::Config) {
    println!("=== Cinerank Dry Run ===\n");

    println!("Store:");
    println!("  Database path: {}", config.store.database_path);
    println!();

    println!("WebDriver:");
    println!("  Endpoint: {}", config.webdriver.endpoint);
    println!(
        "  Page-load timeout: {}s",
        config.webdriver.page_load_timeout_secs
    );
    println!();

    println!("Harvest:");
    println!("  Listing URL: {}", config.harvest.listing_url);
    println!("  Max movies: {}", config.harvest.max_movies);
    println!("  Max cast per movie: {}", config.harvest.max_cast);
    println!("  Readiness wait: {}s", config.harvest.wait_timeout_secs);
    println!("  Settle delay: {}ms", config.harvest.settle_ms);
    println!();

    println!("Configuration is valid. No pages were fetched.");
}
