//! Tintuc main entry point
//!
//! Command-line interface for the category-aware news crawler.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tintuc::config::{load_config_with_hash, Config};
use tintuc::Crawler;
use tracing_subscriber::EnvFilter;

/// Tintuc: a category-aware news article crawler
///
/// Walks a news site's category hierarchy, extracts articles with their
/// metadata, and stores them in a normalized, indexed file tree for a
/// downstream summarizer.
#[derive(Parser, Debug)]
#[command(name = "tintuc")]
#[command(version = "1.0.0")]
#[command(about = "A category-aware news article crawler", long_about = None)]
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

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the latest output directory and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,

    /// Override the configured category cap
    #[arg(long, value_name = "N")]
    max_categories: Option<usize>,

    /// Override the configured subcategory cap
    #[arg(long, value_name = "N")]
    max_subcategories: Option<usize>,

    /// Override the configured articles-per-listing cap
    #[arg(long, value_name = "N")]
    max_articles: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) =
        load_config_with_hash(&cli.config).context("failed to load configuration")?;
    tracing::info!("Configuration loaded (hash: {})", config_hash);

    apply_overrides(&mut config, &cli);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    if cli.stats {
        return handle_stats(&config);
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tintuc=info,warn"),
            1 => EnvFilter::new("tintuc=debug,info"),
            2 => EnvFilter::new("tintuc=trace,debug"),
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

/// CLI cap overrides take precedence over the config file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if cli.max_categories.is_some() {
        config.crawler.max_categories = cli.max_categories;
    }
    if cli.max_subcategories.is_some() {
        config.crawler.max_subcategories = cli.max_subcategories;
    }
    if let Some(max) = cli.max_articles {
        config.crawler.max_articles = max;
    }
}

/// Today's dated output directory under the configured base
fn dated_output_dir(config: &Config) -> PathBuf {
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    Path::new(&config.output.base_dir).join(today)
}

/// Handles the --dry-run mode: validates config and shows the crawl plan
fn handle_dry_run(config: &Config) {
    println!("=== Tintuc Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Source id: {}", config.site.source_id);
    println!("  Article suffix: {}", config.site.article_suffix);
    println!(
        "  Excluded categories: {}",
        config.site.excluded_categories.join(", ")
    );

    println!("\nCrawler:");
    println!(
        "  Retries: {} (delay {}s, timeout {}s)",
        config.crawler.max_retries,
        config.crawler.retry_delay_secs,
        config.crawler.request_timeout_secs
    );
    println!(
        "  Delays: {}ms/article, {}ms/subcategory, {}ms/category",
        config.crawler.delay_between_requests_ms,
        config.crawler.delay_between_subcategories_ms,
        config.crawler.delay_between_categories_ms
    );
    println!(
        "  Caps: categories {}, subcategories {}, articles {}",
        cap(config.crawler.max_categories),
        cap(config.crawler.max_subcategories),
        config.crawler.max_articles
    );

    println!("\nOutput:");
    println!("  Directory: {}", dated_output_dir(config).display());
    println!("  Mapping file: {}", config.output.mapping_file);

    println!("\n✓ Configuration is valid");
}

fn cap(value: Option<usize>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "all".to_string())
}

/// Handles the --stats mode: scans the latest output tree and prints counts
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let latest = Path::new(&config.output.base_dir).join("latest");
    let target = if latest.exists() {
        latest
    } else {
        dated_output_dir(config)
    };

    println!("Output directory: {}\n", target.display());

    let stats = tintuc::store::scan(&target).context("failed to scan output directory")?;

    println!("=== Store Statistics ===\n");
    println!("  Categories: {}", stats.categories);
    println!("  Subcategories: {}", stats.subcategories);
    println!("  Articles: {}", stats.articles);

    if !stats.articles_by_category.is_empty() {
        println!("\nArticles by category:");
        let mut counts: Vec<_> = stats.articles_by_category.iter().collect();
        counts.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
        for (category, count) in counts {
            println!("  {}: {}", category, count);
        }
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let output_dir = dated_output_dir(&config);
    tracing::info!("Output directory: {}", output_dir.display());

    if output_dir.is_dir() && std::fs::read_dir(&output_dir)?.next().is_some() {
        tracing::warn!(
            "{} already contains data; indices restart at 1 and existing files will be overwritten",
            output_dir.display()
        );
    }

    let base_dir = config.output.base_dir.clone();
    let mut crawler =
        Crawler::new(config, &output_dir).context("failed to initialize crawler")?;

    let stats = crawler.run().await.context("crawl failed")?;

    update_latest_symlink(Path::new(&base_dir), &output_dir);

    println!("=== Crawl Complete ===\n");
    println!("  Categories processed: {}", stats.categories);
    println!("  Subcategories processed: {}", stats.subcategories);
    println!("  Articles saved: {}", stats.articles);
    println!("  Output: {}", output_dir.display());

    Ok(())
}

/// Points `<base>/latest` at the dated directory of this run
///
/// Failure to create the symlink is a warning, not a run failure.
fn update_latest_symlink(base_dir: &Path, output_dir: &Path) {
    #[cfg(unix)]
    {
        let link = base_dir.join("latest");
        let target = match output_dir.file_name() {
            Some(name) => PathBuf::from(name),
            None => return,
        };

        if link.exists() || link.symlink_metadata().is_ok() {
            if let Err(e) = std::fs::remove_file(&link) {
                tracing::warn!("could not remove old 'latest' symlink: {}", e);
                return;
            }
        }

        match std::os::unix::fs::symlink(&target, &link) {
            Ok(()) => tracing::info!("updated symlink {} -> {}", link.display(), target.display()),
            Err(e) => tracing::warn!("could not create 'latest' symlink: {}", e),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = (base_dir, output_dir);
        tracing::debug!("symlinks not supported on this platform, skipping 'latest'");
    }
}
