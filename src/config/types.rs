use serde::Deserialize;

/// Main configuration structure for Site-Auditor
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub seo: SeoConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// The audited site
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Root URL of the site; only pages on this host are crawled
    #[serde(rename = "base-url")]
    pub base_url: String,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler, also used as the robots.txt identity token
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `CrawlerName/Version` or `CrawlerName/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }

    /// Token matched against `User-agent:` lines in robots.txt
    pub fn identity_token(&self) -> String {
        self.crawler_name.to_lowercase()
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Total attempts for a request that times out or fails to connect
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retry attempts (milliseconds, doubled per attempt)
    #[serde(rename = "retry-backoff-ms", default)]
    pub retry_backoff_ms: u64,

    /// Maximum number of pages recorded per crawl session
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,

    /// Delay between requests in seconds
    #[serde(rename = "crawl-delay", default = "default_crawl_delay")]
    pub crawl_delay: f64,

    /// Whether robots.txt Disallow rules are honored
    #[serde(rename = "respect-robots-txt", default = "default_true")]
    pub respect_robots_txt: bool,

    /// Persist the page store every N pages (0 disables checkpoints)
    #[serde(rename = "checkpoint-interval", default)]
    pub checkpoint_interval: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: 0,
            max_pages: default_max_pages(),
            crawl_delay: default_crawl_delay(),
            respect_robots_txt: true,
            checkpoint_interval: 0,
        }
    }
}

/// SEO analysis configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeoConfig {
    /// Keywords whose presence is measured across the site
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the JSON page-record file
    #[serde(rename = "data-path", default = "default_data_path")]
    pub data_path: String,

    /// Directory that receives generated reports
    #[serde(rename = "report-dir", default = "default_report_dir")]
    pub report_dir: String,

    /// Optional custom report template
    #[serde(rename = "report-template", default)]
    pub report_template: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            report_dir: default_report_dir(),
            report_template: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_max_pages() -> usize {
    100
}

fn default_crawl_delay() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_data_path() -> String {
    "data/scraped_data.json".to_string()
}

fn default_report_dir() -> String {
    "reports".to_string()
}
