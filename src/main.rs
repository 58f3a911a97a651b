//! Ripple-Crawl main entry point
//!
//! This is the command-line interface for the Ripple-Crawl crawler core. It
//! crawls a canned dataset (the built-in golang.org sample, or pages listed in
//! a TOML configuration file) and prints every result record.

use anyhow::Context;
use clap::Parser;
use ripple_crawl::config::{load_config_with_hash, validate, Config};
use ripple_crawl::crawler::Crawler;
use ripple_crawl::output::{print_statistics, CrawlStatistics};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Ripple-Crawl: a concurrent, depth-bounded crawler
///
/// Fans out one task per discovered link, caches every fetch and waits for
/// the whole task graph to finish before printing the results.
#[derive(Parser, Debug)]
#[command(name = "ripple-crawl")]
#[command(version = "1.0.0")]
#[command(about = "A concurrent, depth-bounded crawler", long_about = None)]
struct Cli {
    /// URL to start from (overrides the configuration)
    #[arg(value_name = "ROOT")]
    root: Option<String>,

    /// Maximum crawl depth (overrides the configuration)
    #[arg(short, long)]
    depth: Option<u32>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Maximum number of concurrent fetches (overrides the configuration)
    #[arg(long)]
    max_concurrency: Option<usize>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration given, using the built-in sample dataset");
            Config::default()
        }
    };

    apply_overrides(&mut config, &cli);

    if cli.dry_run {
        validate(&config).context("invalid configuration")?;
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(&config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ripple_crawl=info,warn"),
            1 => EnvFilter::new("ripple_crawl=debug,info"),
            2 => EnvFilter::new("ripple_crawl=trace,debug"),
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

/// Applies command-line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(root) = &cli.root {
        config.crawler.root_url = root.clone();
    }
    if let Some(depth) = cli.depth {
        config.crawler.max_depth = depth;
    }
    if cli.max_concurrency.is_some() {
        config.crawler.max_concurrency = cli.max_concurrency;
    }
}

/// Handles the --dry-run mode: shows the resolved configuration
fn handle_dry_run(config: &Config) {
    println!("=== Ripple-Crawl Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Root URL: {}", config.crawler.root_url);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Result capacity: {}", config.crawler.result_capacity);
    match config.crawler.max_concurrency {
        Some(limit) => println!("  Max concurrency: {}", limit),
        None => println!("  Max concurrency: unlimited"),
    }
    println!("  Fetch delay: {}ms", config.crawler.fetch_delay_ms);

    if config.pages.is_empty() {
        println!("\nPages: built-in golang.org sample");
    } else {
        println!("\nPages ({}):", config.pages.len());
        for page in &config.pages {
            println!("  - {} ({} links)", page.url, page.links.len());
        }
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config) -> anyhow::Result<()> {
    let crawler = Crawler::from_config(config).context("invalid configuration")?;

    let output = crawler
        .crawl(&config.crawler.root_url, config.crawler.max_depth)
        .await
        .context("crawl failed")?;

    let cache_stats = crawler.fetcher().stats().await;
    let stats = CrawlStatistics::collect(&output, Some(cache_stats));

    for report in output.reports().await {
        println!("Result: {}", report);
    }
    println!();
    print_statistics(&stats);

    Ok(())
}
