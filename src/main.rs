//! autodocs-scrape main entry point
//!
//! Command-line interface: detects the documentation format behind a base
//! URL, scrapes the site with the matching strategy, and prints the outcome.

use anyhow::Context;
use autodocs_scrape::config::{load_config, validate, Config};
use autodocs_scrape::progress::LogSink;
use autodocs_scrape::{detect_format, scrape, CancelFlag, Fetcher};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Detect and scrape documentation sites
///
/// Given a documentation base URL, autodocs-scrape works out whether the site
/// was built with Sphinx or MkDocs (falling back to a bounded generic crawl),
/// scrapes every page, and prints the result.
#[derive(Parser, Debug)]
#[command(name = "autodocs-scrape")]
#[command(version)]
#[command(about = "Detect and scrape documentation sites", long_about = None)]
struct Cli {
    /// Documentation base URL (e.g. https://docs.example.com/en/latest/)
    #[arg(value_name = "URL")]
    url: String,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the request timeout in seconds (30-60)
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Override the crawl page budget
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Override the crawl depth limit
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Detect the documentation format and exit without scraping
    #[arg(long)]
    detect_only: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };
    apply_overrides(&mut config, &cli);
    validate(&config).context("configuration is invalid after CLI overrides")?;

    let base_url = parse_base_url(&cli.url)?;

    let fetcher = Fetcher::new(&config, Arc::new(LogSink))?;

    tracing::info!("Detecting documentation format for {}", base_url);
    let format = detect_format(&fetcher, &base_url).await?;
    println!("Detected format: {}", format);

    if cli.detect_only {
        return Ok(());
    }

    // Abort between pages on interrupt; the in-flight request runs to its
    // own timeout
    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received; stopping after the current fetch");
                cancel.cancel();
            }
        });
    }

    let outcome = scrape(&fetcher, &base_url, format, &config.crawl, &cancel).await?;

    println!("\n=== Scrape Summary ===");
    println!("Format:         {}", outcome.format);
    println!("Pages scraped:  {}", outcome.pages.len());
    println!("Failed fetches: {}", outcome.failed_fetches);
    for page in &outcome.pages {
        println!("  [{:>3}] {} ({})", page.index, page.title, page.url);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("autodocs_scrape=info,warn"),
            1 => EnvFilter::new("autodocs_scrape=debug,info"),
            2 => EnvFilter::new("autodocs_scrape=trace,debug"),
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

/// Applies CLI flag overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(timeout) = cli.timeout_secs {
        config.fetch.timeout_secs = timeout;
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawl.max_pages = max_pages;
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawl.max_depth = max_depth;
    }
}

/// Parses the base URL, appending a trailing slash so joins treat it as a
/// directory
fn parse_base_url(raw: &str) -> anyhow::Result<Url> {
    let mut normalized = raw.to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    Url::parse(&normalized).with_context(|| format!("invalid URL: {}", raw))
}
