//! Bibcrawl main entry point
//!
//! This is the command-line interface for the Bibcrawl feed crawler.

use anyhow::{bail, Context};
use bibcrawl::config::{load_config_with_hash, validate, Config};
use bibcrawl::crawler::{run_crawl, Action, ContentExtractor, EntryHandler, FetchedEntry};
use bibcrawl::output::print_report;
use bibcrawl::url::SeedConfig;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Bibcrawl: a feed-driven blog crawler
///
/// Bibcrawl finds the RSS or Atom feed of a blog from its start page,
/// fetches every entry the feed lists, and reports what it collected.
#[derive(Parser, Debug)]
#[command(name = "bibcrawl")]
#[command(version)]
#[command(about = "A feed-driven blog crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Start page URL (overrides the configuration file)
    #[arg(long, value_name = "URL")]
    start_url: Option<String>,

    /// Allowed domain (defaults to the start URL's host)
    #[arg(long, value_name = "DOMAIN")]
    domain: Option<String>,

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

/// One line of output per fetched entry
#[derive(Debug)]
struct EntrySummary {
    url: Url,
    final_url: Url,
    title: Option<String>,
    bytes: usize,
}

/// Emits an [`EntrySummary`] for every fetched entry
struct SummaryHandler;

impl EntryHandler for SummaryHandler {
    type Item = EntrySummary;

    fn handle_entries(
        &mut self,
        entries: Vec<FetchedEntry>,
        extractor: &dyn ContentExtractor,
    ) -> Vec<Action<EntrySummary>> {
        entries
            .into_iter()
            .map(|entry| {
                let title = extractor
                    .pages()
                    .iter()
                    .find(|page| page.url == entry.source_url)
                    .and_then(|page| page.title.clone());

                Action::Emit(EntrySummary {
                    bytes: entry.body.len(),
                    url: entry.source_url,
                    final_url: entry.final_url,
                    title,
                })
            })
            .collect()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config)
    } else {
        handle_crawl(config, cli.quiet).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("bibcrawl=info,warn"),
            1 => EnvFilter::new("bibcrawl=debug,info"),
            2 => EnvFilter::new("bibcrawl=trace,debug"),
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

/// Builds the effective configuration from the file and the command line
///
/// Command-line seed options override the file. Without a file, defaults
/// are used and `--start-url` is required.
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => match &cli.start_url {
            Some(start_url) => Config::for_seed(start_url.clone(), None),
            None => bail!("Either a CONFIG file or --start-url is required"),
        },
    };

    if let Some(start_url) = &cli.start_url {
        config.crawl.start_url = start_url.clone();
    }
    if let Some(domain) = &cli.domain {
        config.crawl.domain = Some(domain.clone());
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let seed = SeedConfig::new(&config.crawl.start_url, config.crawl.domain.as_deref())?;

    println!("=== Bibcrawl Dry Run ===\n");

    println!("Crawl:");
    println!("  Start URL: {}", seed.start_url());
    println!("  Allowed domain: {}", seed.allowed_domain());

    println!("\nFetch:");
    println!(
        "  Max concurrent fetches: {}",
        config.fetch.max_concurrent_fetches
    );
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!("  Connect timeout: {}s", config.fetch.connect_timeout_secs);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.user_agent_string());

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, quiet: bool) -> anyhow::Result<()> {
    tracing::info!("Starting crawl of {}", config.crawl.start_url);

    let run = run_crawl(&config, SummaryHandler)
        .await
        .context("Crawl could not be started")?;
    let report = run.crawl.report();

    if !quiet {
        for item in &run.items {
            let moved = if item.final_url != item.url {
                format!(" -> {}", item.final_url)
            } else {
                String::new()
            };
            println!(
                "{}{} [{} bytes] {}",
                item.url,
                moved,
                item.bytes,
                item.title.as_deref().unwrap_or("(untitled)")
            );
        }
        println!();
        print_report(&report, Some(&run.stats));
    }

    if let Err(error) = run.crawl.outcome() {
        bail!("Crawl did not complete ({}): {}", run.crawl.phase(), error);
    }

    tracing::info!("Crawl completed successfully");
    Ok(())
}
