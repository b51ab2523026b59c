//! Site-Auditor main entry point
//!
//! This is the command-line interface for the Site-Auditor crawler and report
//! generator.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use site_auditor::analysis::{PerformanceAnalyzer, SeoAnalyzer, StructureAnalyzer};
use site_auditor::config::{load_config_with_hash, Config};
use site_auditor::output::{print_statistics, ReportData, ReportGenerator};
use site_auditor::{extract_domain, PageRecord, Scraper};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Site-Auditor: a polite single-site crawler and audit report generator
///
/// Site-Auditor crawls one website breadth-first while respecting robots.txt
/// and a fixed delay between requests, then analyzes the collected pages and
/// writes a markdown audit report.
#[derive(Parser, Debug)]
#[command(name = "site-auditor")]
#[command(version)]
#[command(about = "A polite single-site crawler and audit report generator", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Stage to run; stages other than scraper read previously saved pages
    #[arg(short, long, value_enum, default_value_t = Stage::All)]
    module: Stage,

    /// Report path (default: <report-dir>/<host>_analysis_report_<timestamp>.md)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Stage {
    Scraper,
    Structure,
    Seo,
    Performance,
    Report,
    All,
}

impl Stage {
    fn includes(self, stage: Stage) -> bool {
        self == Stage::All || self == stage
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let start_time = Instant::now();

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let mut scraper = Scraper::new(&config)?;
    let data_path = Path::new(&config.output.data_path);

    let pages: Vec<PageRecord> = if cli.module.includes(Stage::Scraper) {
        handle_scrape(&mut scraper, &config, cli.quiet).await?;
        scraper
            .save_data(data_path)
            .with_context(|| format!("Failed to save pages to {}", data_path.display()))?;
        scraper.pages().to_vec()
    } else {
        scraper
            .load_data(data_path)
            .with_context(|| format!("Failed to load pages from {}", data_path.display()))?
            .to_vec()
    };

    let structure = cli.module.includes(Stage::Structure).then(|| {
        tracing::info!("Analyzing site structure...");
        StructureAnalyzer::new().analyze(&pages)
    });

    let seo = cli.module.includes(Stage::Seo).then(|| {
        tracing::info!("Analyzing SEO for {} keyword(s)...", config.seo.keywords.len());
        SeoAnalyzer::new(config.seo.keywords.clone()).analyze(&pages)
    });

    let performance = cli.module.includes(Stage::Performance).then(|| {
        tracing::info!("Analyzing performance...");
        PerformanceAnalyzer::new().analyze(&pages)
    });

    if cli.module.includes(Stage::Report) {
        let data = ReportData {
            site_url: config.site.base_url.clone(),
            date: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            pages_count: pages.len(),
            config_hash,
            structure,
            seo,
            performance,
        };

        let output_path = cli
            .output
            .clone()
            .unwrap_or_else(|| default_report_path(&config, &scraper));

        handle_report(&config, &data, &output_path)?;
    }

    tracing::info!(
        "Analysis finished in {:.2} seconds",
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_auditor=info,warn"),
            1 => EnvFilter::new("site_auditor=debug,info"),
            2 => EnvFilter::new("site_auditor=trace,debug"),
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

/// Runs the crawl with the configured limits
async fn handle_scrape(scraper: &mut Scraper, config: &Config, quiet: bool) -> anyhow::Result<()> {
    let crawler = &config.crawler;
    tracing::info!(
        "Scraping {} (max pages: {}, delay: {}s, robots.txt: {})",
        scraper.base_url(),
        crawler.max_pages,
        crawler.crawl_delay,
        if crawler.respect_robots_txt { "respected" } else { "ignored" }
    );

    let pages = scraper
        .scrape_site(
            crawler.max_pages,
            Duration::from_secs_f64(crawler.crawl_delay),
            crawler.respect_robots_txt,
        )
        .await
        .context("Crawl failed")?;

    tracing::info!("Scraping finished: {} pages collected", pages.len());

    if !quiet {
        print_statistics(scraper.stats());
    }

    Ok(())
}

/// Renders the report with the configured template
fn handle_report(config: &Config, data: &ReportData, output_path: &Path) -> anyhow::Result<()> {
    let generator = match &config.output.report_template {
        Some(template) => ReportGenerator::from_file(Path::new(template))
            .with_context(|| format!("Failed to load report template {}", template))?,
        None => ReportGenerator::default(),
    };

    generator
        .generate(data, output_path)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    tracing::info!("Report saved to: {}", output_path.display());
    Ok(())
}

fn default_report_path(config: &Config, scraper: &Scraper) -> PathBuf {
    let host = extract_domain(scraper.base_url()).unwrap_or_else(|| "site".to_string());
    let timestamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");

    Path::new(&config.output.report_dir).join(format!("{}_analysis_report_{}.md", host, timestamp))
}
