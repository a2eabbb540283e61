//! Merch-Ripple main entry point
//!
//! This is the command-line interface for the Merch-Ripple merch tracker.

use anyhow::Context;
use clap::Parser;
use merch_ripple::config::{load_config_with_hash, Config};
use merch_ripple::input::read_label_urls;
use merch_ripple::output::{JsonSink, RecordSink};
use merch_ripple::Coordinator;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Merch-Ripple: a storefront merch availability tracker
///
/// Crawls the merch listings of the given labels and prints every in-stock
/// package as a JSON array on stdout. Logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "merch-ripple")]
#[command(version)]
#[command(about = "A storefront merch availability tracker", long_about = None)]
struct Cli {
    /// Newline-delimited file of label URLs (overrides input.labels-path)
    #[arg(value_name = "LABELS")]
    labels: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the rate-limit backoff base delay (milliseconds)
    #[arg(long, value_name = "MS")]
    base_delay_ms: Option<u64>,

    /// Skip TLS certificate verification
    #[arg(long)]
    insecure: bool,

    /// Show the resolved configuration and seeds without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };
    apply_overrides(&mut config, &cli);
    merch_ripple::config::validate(&config)?;

    let labels_path = cli
        .labels
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.input.labels_path));
    let seeds = read_label_urls(&labels_path)
        .with_context(|| format!("failed to read labels from {}", labels_path.display()))?;
    tracing::info!("Read {} label urls from {}", seeds.len(), labels_path.display());

    if cli.dry_run {
        print_dry_run(&config, &seeds);
        return Ok(());
    }

    let coordinator = Coordinator::new(&config)?;
    let records = coordinator.crawl_labels(&seeds).await;

    let mut sink = JsonSink::new(std::io::stdout().lock());
    sink.write_records(&records)?;

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs are written to stderr; stdout carries the JSON output only.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("merch_ripple=info,warn"),
            1 => EnvFilter::new("merch_ripple=debug,info"),
            2 => EnvFilter::new("merch_ripple=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(base_delay_ms) = cli.base_delay_ms {
        config.fetcher.base_delay_ms = base_delay_ms;
    }
    if cli.insecure {
        config.fetcher.accept_invalid_certs = true;
    }
}

/// Handles the --dry-run mode: shows what would be crawled
fn print_dry_run(config: &Config, seeds: &[String]) {
    println!("=== Merch-Ripple Dry Run ===\n");

    println!("Fetcher Configuration:");
    println!("  Backoff base delay: {}ms", config.fetcher.base_delay_ms);
    println!("  Max retries on 429: {}", config.fetcher.max_retries);
    println!("  Request timeout: {}s", config.fetcher.request_timeout_secs);
    println!("  Connect timeout: {}s", config.fetcher.connect_timeout_secs);
    println!(
        "  TLS verification: {}",
        if config.fetcher.accept_invalid_certs {
            "disabled"
        } else {
            "enabled"
        }
    );

    println!("\nCrawler Configuration:");
    println!(
        "  Max concurrent item fetches per label: {}",
        config.crawler.max_concurrent_fetches
    );
    println!(
        "  Max concurrent labels: {}",
        config.crawler.max_concurrent_labels
    );

    println!("\nLabels ({}):", seeds.len());
    for seed in seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
}
