//! Crawler coordinator - main crawl orchestration logic
//!
//! This module owns one crawl session from the availability check to the
//! final page list:
//! - Checking that the site answers at all
//! - Loading robots.txt rules
//! - Draining the frontier breadth-first with a fixed delay between requests
//! - Turning fetched pages into page records
//! - Periodic checkpoints of the records collected so far

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, FetchResult, Fetcher};
use crate::crawler::parser::parse_html;
use crate::crawler::scheduler::Frontier;
use crate::output::CrawlStatistics;
use crate::robots::{load_robots, RobotsRuleSet};
use crate::state::CrawlState;
use crate::storage::{PageRecord, PageStore};
use crate::url::{is_in_scope, normalize_url};
use crate::AuditError;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use url::Url;

/// Pages between two progress log lines
const PROGRESS_INTERVAL: usize = 10;

/// State of one `scrape_site` invocation
///
/// The session is created fresh for every call; nothing carries over between
/// sessions except what the caller persists.
#[derive(Debug)]
pub struct CrawlSession {
    pub base_url: Url,
    pub max_pages: usize,
    pub crawl_delay: Duration,
    pub respect_robots: bool,
    state: CrawlState,
    frontier: Frontier,
    rules: RobotsRuleSet,
    pages: Vec<PageRecord>,
}

impl CrawlSession {
    pub fn new(base_url: Url, max_pages: usize, crawl_delay: Duration, respect_robots: bool) -> Self {
        Self {
            base_url,
            max_pages,
            crawl_delay,
            respect_robots,
            state: CrawlState::Initializing,
            frontier: Frontier::new(),
            rules: RobotsRuleSet::allow_all(),
            pages: Vec::new(),
        }
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    pub fn pages(&self) -> &[PageRecord] {
        &self.pages
    }

    /// Moves the session to `next`, rejecting transitions the lifecycle forbids
    pub fn transition(&mut self, next: CrawlState) -> Result<(), AuditError> {
        if !self.state.can_transition_to(next) {
            return Err(AuditError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        tracing::debug!("Crawl session {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    /// True once the page cap is reached or nothing is left to visit
    fn is_finished(&self) -> bool {
        self.frontier.is_empty() || self.pages.len() >= self.max_pages
    }
}

/// Where and how often partial results are written during a crawl
#[derive(Debug, Clone)]
struct Checkpoint {
    path: PathBuf,
    interval: usize,
}

/// Crawls one site and keeps the resulting page records
pub struct Scraper {
    base_url: Url,
    fetcher: Fetcher,
    identity: String,
    store: PageStore,
    stats: CrawlStatistics,
    checkpoint: Option<Checkpoint>,
}

impl Scraper {
    /// Creates a scraper for the site configured in `config`
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration; the HTTP client takes its user
    ///   agent and timeout from it, the fetcher its retry policy
    ///
    /// # Returns
    ///
    /// * `Ok(Scraper)` - Ready to crawl
    /// * `Err(AuditError)` - The base URL is invalid or the client could not be built
    pub fn new(config: &Config) -> Result<Self, AuditError> {
        let base_url = normalize_url(&config.site.base_url)?;

        let client = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.crawler.timeout_secs),
        )?;
        let fetcher = Fetcher::new(
            client,
            config.crawler.max_retries,
            Duration::from_millis(config.crawler.retry_backoff_ms),
        );

        let checkpoint = (config.crawler.checkpoint_interval > 0).then(|| Checkpoint {
            path: PathBuf::from(&config.output.data_path),
            interval: config.crawler.checkpoint_interval,
        });

        Ok(Self {
            base_url,
            fetcher,
            identity: config.user_agent.identity_token(),
            store: PageStore::new(),
            stats: CrawlStatistics::new(),
            checkpoint,
        })
    }

    /// Writes the records collected so far to `path` every `interval` pages
    ///
    /// An interval of 0 disables checkpoints.
    pub fn with_checkpoint(mut self, path: impl Into<PathBuf>, interval: usize) -> Self {
        self.checkpoint = (interval > 0).then(|| Checkpoint {
            path: path.into(),
            interval,
        });
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Records of the last crawl or load
    pub fn pages(&self) -> &[PageRecord] {
        self.store.records()
    }

    /// Statistics of the last crawl
    pub fn stats(&self) -> &CrawlStatistics {
        &self.stats
    }

    /// Crawls the site breadth-first and returns the fetched pages in fetch order
    ///
    /// # Arguments
    ///
    /// * `max_pages` - Upper bound on returned records; robots-skipped and
    ///   failed URLs do not count towards it
    /// * `crawl_delay` - Pause after every processed URL except the last
    /// * `respect_robots_txt` - Skip URLs disallowed for this crawler
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<PageRecord>)` - At most `max_pages` records, each URL once
    /// * `Err(AuditError::SiteUnreachable)` - The base URL could not be fetched
    pub async fn scrape_site(
        &mut self,
        max_pages: usize,
        crawl_delay: Duration,
        respect_robots_txt: bool,
    ) -> Result<Vec<PageRecord>, AuditError> {
        let start_time = Instant::now();
        self.stats = CrawlStatistics::new();

        let mut session = CrawlSession::new(
            self.base_url.clone(),
            max_pages,
            crawl_delay,
            respect_robots_txt,
        );

        tracing::info!("Checking availability of {}", session.base_url);
        if let FetchResult::Failure { kind, message } = self.fetcher.fetch(&session.base_url).await {
            session.transition(CrawlState::Aborted)?;
            tracing::error!("{} is unreachable ({}): {}", session.base_url, kind, message);
            self.stats.elapsed = start_time.elapsed();
            return Err(AuditError::SiteUnreachable {
                url: session.base_url.to_string(),
                kind,
                message,
            });
        }

        if session.respect_robots {
            session.rules = load_robots(self.fetcher.client(), &session.base_url, &self.identity).await;
        } else {
            tracing::info!("Ignoring robots.txt");
        }

        session.frontier.enqueue(session.base_url.clone());
        session.transition(CrawlState::Crawling)?;

        tracing::info!(
            "Starting crawl of {} (max {} pages, {:?} delay)",
            session.base_url,
            session.max_pages,
            session.crawl_delay
        );

        while !session.is_finished() {
            let Some(url) = session.frontier.pop() else {
                break;
            };

            let requested = self.process_url(&mut session, url).await;

            if session.is_finished() {
                break;
            }

            if requested && !session.crawl_delay.is_zero() {
                tokio::time::sleep(session.crawl_delay).await;
            }
        }

        session.transition(CrawlState::Completed)?;

        self.stats.left_in_frontier = session.frontier.len() as u64;
        self.stats.elapsed = start_time.elapsed();

        tracing::info!(
            "Crawl completed: {} pages in {:.1}s ({} failed, {} skipped by robots.txt)",
            session.pages.len(),
            self.stats.elapsed.as_secs_f64(),
            self.stats.total_failures(),
            self.stats.skipped_by_robots
        );

        self.store = PageStore::from_records(session.pages.clone());
        Ok(session.pages)
    }

    /// Handles one URL popped from the frontier
    ///
    /// Returns false when the URL was skipped without a request.
    async fn process_url(&mut self, session: &mut CrawlSession, url: Url) -> bool {
        if session.respect_robots && !session.rules.is_allowed(&url) {
            tracing::info!("Skipping {} (disallowed by robots.txt)", url);
            self.stats.skipped_by_robots += 1;
            return false;
        }

        tracing::debug!("Fetching {}", url);
        self.stats.attempted += 1;

        let (status_code, body, elapsed) = match self.fetcher.fetch(&url).await {
            FetchResult::Success {
                status_code,
                body,
                elapsed,
                ..
            } => (status_code, body, elapsed),
            FetchResult::Failure { kind, message } => {
                tracing::warn!("Failed to fetch {} ({}): {}", url, kind, message);
                self.stats.record_failure(kind);
                return true;
            }
        };

        let parsed = parse_html(&body, &url);
        tracing::info!(
            "Fetched {} (HTTP {}, {} ms, {} links)",
            url,
            status_code,
            elapsed.as_millis(),
            parsed.links.len()
        );

        for link in &parsed.links {
            if is_in_scope(link, &session.base_url, session.frontier.visited()) {
                if let Ok(normalized) = normalize_url(link) {
                    session.frontier.enqueue(normalized);
                }
            }
        }

        session.pages.push(PageRecord {
            url: url.to_string(),
            status_code,
            fetched_at: Utc::now(),
            html: body,
            extracted_links: parsed.links,
            text_content: parsed.text_content,
            metadata: parsed.metadata,
            response_time_ms: elapsed.as_millis() as u64,
        });
        self.stats.fetched += 1;

        let count = session.pages.len();
        if count % PROGRESS_INTERVAL == 0 {
            tracing::info!(
                "Progress: {}/{} pages, {} in frontier",
                count,
                session.max_pages,
                session.frontier.len()
            );
        }

        if let Some(checkpoint) = &self.checkpoint {
            if count % checkpoint.interval == 0 {
                match PageStore::from_records(session.pages.clone()).save(&checkpoint.path) {
                    Ok(()) => tracing::info!(
                        "Checkpoint: {} pages written to {}",
                        count,
                        checkpoint.path.display()
                    ),
                    Err(e) => tracing::warn!("Checkpoint to {} failed: {}", checkpoint.path.display(), e),
                }
            }
        }

        true
    }

    /// Persists the records of the last crawl or load
    pub fn save_data(&self, path: &Path) -> Result<(), AuditError> {
        self.store.save(path)?;
        tracing::info!("Saved {} pages to {}", self.store.len(), path.display());
        Ok(())
    }

    /// Replaces the in-memory records with those stored at `path`
    pub fn load_data(&mut self, path: &Path) -> Result<&[PageRecord], AuditError> {
        self.store = PageStore::load(path)?;
        tracing::info!("Loaded {} pages from {}", self.store.len(), path.display());
        Ok(self.store.records())
    }
}
