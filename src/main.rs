//! Board-Harvest main entry point
//!
//! This is the command-line interface for the Board-Harvest PTT crawler.

use board_harvest::config::{parse_config_with_hash, validate, Config};
use board_harvest::crawler::harvest;
use board_harvest::output::print_statistics;
use chrono::Local;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Board-Harvest: a PTT board crawler
///
/// Board-Harvest walks the newest index pages of a board, extracts article
/// metadata and push comments, optionally geolocates posters' IP addresses,
/// and appends everything to two CSV tables.
#[derive(Parser, Debug)]
#[command(name = "board-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A PTT board crawler", long_about = None)]
struct Cli {
    /// Board to crawl
    #[arg(short, long)]
    board: Option<String>,

    /// Number of index pages to crawl, counting the newest page
    #[arg(short, long)]
    pages: Option<u32>,

    /// Article table path; comments go to `{stem}_push.csv` beside it
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    file: Option<String>,

    /// Geolocate article and comment IP addresses
    #[arg(short = 'l', long = "geolocate")]
    geolocate: bool,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate settings and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match parse_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => Config::default(),
    };

    // Validated once, after flags had their say
    apply_overrides(&mut config, &cli);
    if let Err(e) = validate(&config) {
        tracing::error!("Invalid configuration: {}", e);
        return Err(e.into());
    }

    if cli.dry_run {
        handle_dry_run(&config);
    } else {
        handle_crawl(config, cli.quiet).await?;
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
            0 => EnvFilter::new("board_harvest=info,warn"),
            1 => EnvFilter::new("board_harvest=debug,info"),
            2 => EnvFilter::new("board_harvest=trace,debug"),
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

/// Command-line flags win over the configuration file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(board) = &cli.board {
        config.crawler.board = board.clone();
    }
    if let Some(pages) = cli.pages {
        config.crawler.pages = pages;
    }
    if let Some(file) = &cli.file {
        config.output.articles_path = Some(file.clone());
    }
    if cli.geolocate {
        config.geolocation.enabled = true;
    }
}

/// Handles the --dry-run mode: shows the resolved settings
fn handle_dry_run(config: &Config) {
    let (articles, comments) = config
        .output
        .resolve_paths(&config.crawler.board, Local::now().date_naive());

    println!("=== Board-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Board: {}", config.crawler.board);
    println!("  Host: {}", config.crawler.host);
    println!("  Index pages: {}", config.crawler.pages);
    println!("  Retry delay: {}ms", config.crawler.retry_delay_ms);
    println!("  Page floor: {}ms", config.crawler.page_floor_ms);

    println!("\nSkipped Titles ({}):", config.crawler.skip_titles.len());
    for pattern in &config.crawler.skip_titles {
        println!("  - {}", pattern);
    }

    println!("\nGeolocation:");
    if config.geolocation.enabled {
        println!("  Endpoint: {}", config.geolocation.endpoint);
        println!("  Cache: {}", config.geolocation.cache_path);
        println!(
            "  Budget: {} requests per {}s",
            config.geolocation.max_requests, config.geolocation.window_secs
        );
    } else {
        println!("  Disabled");
    }

    println!("\nOutput:");
    println!("  Articles: {}", articles.display());
    println!("  Comments: {}", comments.display());

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl the newest {} index pages of {}",
        config.crawler.pages, config.crawler.board
    );
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, quiet: bool) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Board: {}, pages: {}, geolocation: {}",
        config.crawler.board,
        config.crawler.pages,
        config.geolocation.enabled
    );

    match harvest(config).await {
        Ok(stats) => {
            tracing::info!("Crawl completed successfully");
            if !quiet {
                print_statistics(&stats);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
