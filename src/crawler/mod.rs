//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - HTML parsing into links, text and metadata
//! - The breadth-first frontier
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{CrawlSession, Scraper};
pub use fetcher::{build_http_client, FailureKind, FetchResult, Fetcher};
pub use parser::{extract_links_simple, parse_html, MetadataKey, ParsedPage};
pub use scheduler::Frontier;
