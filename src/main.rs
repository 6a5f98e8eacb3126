//! Folio main entry point
//!
//! This is the command-line interface for the Folio harvester and capturer.

use clap::Parser;
use folio::browser::{ChromeSession, RenderedPage};
use folio::config::{load_config_with_hash, Config};
use folio::output::{load_statistics, print_job_report, print_statistics, print_traversal_report};
use folio::storage::CheckpointLedger;
use folio::{capture, crawler, FolioError};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Folio: a resumable listing harvester and page capturer
///
/// Folio walks a paginated listing in a browser, saves every result link to
/// a checkpoint ledger, and later captures one full-page image per link.
/// Both passes resume where they stopped.
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(version = "0.1.0")]
#[command(about = "A resumable listing harvester and page capturer", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Capture every pending link in the ledger instead of harvesting
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    capture: bool,

    /// Validate config and show what would run without opening a browser
    #[arg(long, conflicts_with_all = ["capture", "stats"])]
    dry_run: bool,

    /// Show ledger statistics and exit
    #[arg(long, conflicts_with_all = ["capture", "dry_run"])]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        let cancel = interrupt_token();
        if cli.capture {
            handle_capture(&config, &cancel).await?;
        } else {
            handle_harvest(&config, &cancel).await?;
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
            0 => EnvFilter::new("folio=info,warn"),
            1 => EnvFilter::new("folio=debug,info"),
            2 => EnvFilter::new("folio=trace,debug"),
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

/// Returns a token cancelled on Ctrl-C
fn interrupt_token() -> CancellationToken {
    let cancel = CancellationToken::new();
    let signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current step");
            signal.cancel();
        }
    });
    cancel
}

/// Handles the --dry-run mode: validates config and shows what would run
fn handle_dry_run(config: &Config) {
    println!("=== Folio Dry Run ===\n");

    println!("Browser:");
    println!("  Headless: {}", config.browser.headless);
    println!("  Login grace: {}s", config.browser.login_grace_secs);
    if let Some(user_agent) = &config.browser.user_agent {
        println!("  User agent: {}", user_agent);
    }

    println!("\nListing:");
    println!("  URL: {}", config.listing.url);
    println!("  Results: {}", config.listing.results_selector);
    println!("  Link attribute: {}", config.listing.link_attribute);
    println!(
        "  Position: {} (fallback: {})",
        config.listing.position_selector, config.listing.position_fallback_selector
    );
    println!("  Next page: {}", config.listing.next_selector);
    println!("  Page ceiling: {}", config.listing.max_pages);

    println!("\nLedger:");
    println!("  Path: {}", config.ledger.path);

    println!("\nCapture:");
    println!("  Artifact directory: {}", config.capture.artifact_dir);
    println!("  Max frames: {}", config.capture.max_frames);
    println!("  Image extension: {}", config.capture.image_extension);

    println!("\nTiming:");
    println!(
        "  Retries: {} (backoff {}ms)",
        config.timing.retry_attempts, config.timing.retry_backoff_ms
    );
    println!("  Control timeout: {}ms", config.timing.control_timeout_ms);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows progress recorded in the ledger
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = CheckpointLedger::open_existing(&config.ledger.path)?;
    let stats = load_statistics(&ledger)?;
    print_statistics(&stats);
    Ok(())
}

/// Handles pass 1: harvest the listing into the ledger
async fn handle_harvest(
    config: &Config,
    cancel: &CancellationToken,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Starting harvest into {}", config.ledger.path);

    let session = ChromeSession::launch(&config.browser).await?;
    let result = async {
        login_grace(config, session.page(), cancel).await?;
        crawler::harvest_listing(config, session.page(), cancel).await
    }
    .await;
    close_session(session).await;

    match result {
        Ok(report) => {
            print_traversal_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles pass 2: capture every pending ledger link
async fn handle_capture(
    config: &Config,
    cancel: &CancellationToken,
) -> Result<(), Box<dyn std::error::Error>> {
    // A missing ledger is reported before a browser is started
    let ledger = CheckpointLedger::open_existing(&config.ledger.path)?;
    let stats = ledger.stats()?;
    tracing::info!(
        "Starting capture: {} of {} links pending",
        stats.pending(),
        stats.total
    );

    let session = ChromeSession::launch(&config.browser).await?;
    let result = async {
        login_grace(config, session.page(), cancel).await?;
        capture::capture_ledger(config, session.page(), cancel).await
    }
    .await;
    close_session(session).await;

    match result {
        Ok(report) => {
            print_job_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Capture failed: {}", e);
            Err(e.into())
        }
    }
}

/// Opens the listing and waits for the operator to sign in
async fn login_grace<P: RenderedPage>(
    config: &Config,
    page: &P,
    cancel: &CancellationToken,
) -> Result<(), FolioError> {
    let grace = Duration::from_secs(config.browser.login_grace_secs);
    if grace.is_zero() {
        return Ok(());
    }

    page.navigate(&config.listing.url).await?;
    tracing::info!("Waiting {}s for manual login", grace.as_secs());

    tokio::select! {
        _ = tokio::time::sleep(grace) => {}
        _ = cancel.cancelled() => tracing::warn!("Login wait interrupted"),
    }
    Ok(())
}

async fn close_session(session: ChromeSession) {
    if let Err(e) = session.close().await {
        tracing::warn!("Closing the browser failed: {}", e);
    }
}
