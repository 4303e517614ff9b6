use campus_spider::crawler::crawler_config::CrawlerConfig;
use campus_spider::crawler::multi_crawler::MultiCrawler;
use campus_spider::crawler::page_fetcher::PageFetcher;
use campus_spider::crawler::page_processor::PageProcessor;
use campus_spider::crawler::url_normalizer::normalize;
use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CommandLineArgs {
    /// TOML configuration file; built-in defaults are used when omitted
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed URLs to start crawling from (replaces the configured seeds)
    #[arg(long, value_name = "URL")]
    seed: Vec<String>,

    /// Maximum number of pages to fetch per seed
    #[arg(long)]
    max_pages: Option<usize>,

    /// Rate limit for crawling (requests per second)
    #[arg(long)]
    rate: Option<f64>,

    /// Where to write the crawl report
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn load_config(args: &CommandLineArgs) -> anyhow::Result<CrawlerConfig> {
    let mut config = match &args.config {
        Some(path) => CrawlerConfig::load(path)?,
        None => CrawlerConfig::default(),
    };

    if !args.seed.is_empty() {
        config.crawl.seeds = args.seed.clone();
    }
    if let Some(max_pages) = args.max_pages {
        config.crawl.max_pages = max_pages;
    }
    if args.rate.is_some() {
        config.crawl.requests_per_second = args.rate;
    }
    if let Some(report) = &args.report {
        config.report.path = report.clone();
    }

    config.validate()?;
    Ok(config)
}

async fn main_impl(args: &CommandLineArgs) -> anyhow::Result<()> {
    let config = load_config(args)?;

    // Set up a shutdown signal handler
    let shutdown_notify = Arc::new(tokio::sync::Notify::new());
    {
        let shutdown_notify = Arc::clone(&shutdown_notify);
        ctrlc::set_handler(move || {
            info!("Received Ctrl+C, shutting down...");
            shutdown_notify.notify_waiters();
        })?;
    }

    let processor = Arc::new(PageProcessor::new(&config)?);
    let fetcher = PageFetcher::new(&config.crawl.user_agent)?;
    let mut multi_crawler = MultiCrawler::new(
        Arc::clone(&shutdown_notify),
        config.crawl.clone(),
        Arc::clone(&processor),
        fetcher,
    );
    for seed in &config.crawl.seeds {
        let seed_url = normalize(seed, None)?;
        if !processor.trap_filter().is_eligible(seed_url.as_str()) {
            warn!(seed = %seed_url, "seed is outside the crawl scope, skipping");
            continue;
        }
        multi_crawler.add_seed(seed_url);
    }

    let crawl_summaries = multi_crawler.run().await?;
    for crawl_summary in &crawl_summaries {
        info!(
            seed = %crawl_summary.seed(),
            fetched = crawl_summary.page_summaries().len(),
            processed = crawl_summary.num_processed(),
            "seed finished"
        );
        for page_summary in crawl_summary.page_summaries() {
            debug!(
                url = %page_summary.url,
                status = ?page_summary.status_code,
                outcome = page_summary.outcome,
                links = page_summary.num_links,
                "page"
            );
        }
    }

    let report = processor.report();
    report.write_to(&config.report.path)?;
    info!(path = %config.report.path.display(), unique_pages = report.unique_pages, "report written");
    info!("{:?}", processor.counts());

    Ok(())
}

#[tokio::main]
async fn main() {
    let args = CommandLineArgs::parse();

    let log_level = match args.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    if let Err(e) = main_impl(&args).await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
