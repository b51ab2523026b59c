//! Performance analysis
//!
//! Works from what the crawl recorded: fetch duration, HTML size and the
//! subresources the markup references. Nothing is re-fetched.

use crate::analysis::TOP_N;
use crate::crawler::MetadataKey;
use crate::storage::PageRecord;
use scraper::{Html, Selector};
use serde::Serialize;

/// Elements that make the browser issue an extra request
const RESOURCE_SELECTORS: &[&str] = &["script[src]", "link[rel~=\"stylesheet\"][href]", "img[src]"];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceReport {
    pub avg_response_time_ms: f64,
    pub max_response_time_ms: u64,
    /// (url, response time in ms), slowest first
    pub slowest_pages: Vec<(String, u64)>,
    /// HTML bytes
    pub avg_page_size: f64,
    pub max_page_size: usize,
    /// Scripts, stylesheets and images per page
    pub avg_resource_requests: f64,
    /// Pages declaring a viewport meta tag
    pub mobile_friendly_pages: usize,
    pub pages_without_viewport: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PerformanceAnalyzer;

impl PerformanceAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, pages: &[PageRecord]) -> PerformanceReport {
        let mut report = PerformanceReport::default();
        if pages.is_empty() {
            return report;
        }

        let selectors: Vec<Selector> = RESOURCE_SELECTORS
            .iter()
            .filter_map(|css| Selector::parse(css).ok())
            .collect();

        let count = pages.len() as f64;
        let mut total_time = 0u64;
        let mut total_size = 0usize;
        let mut total_resources = 0usize;

        for page in pages {
            total_time += page.response_time_ms;
            report.max_response_time_ms = report.max_response_time_ms.max(page.response_time_ms);

            total_size += page.page_size();
            report.max_page_size = report.max_page_size.max(page.page_size());

            total_resources += count_resources(&page.html, &selectors);

            let has_viewport = page
                .meta(MetadataKey::Viewport.as_str())
                .map(|v| !v.trim().is_empty())
                .unwrap_or(false);
            if has_viewport {
                report.mobile_friendly_pages += 1;
            } else {
                report.pages_without_viewport.push(page.url.clone());
            }
        }

        report.avg_response_time_ms = total_time as f64 / count;
        report.avg_page_size = total_size as f64 / count;
        report.avg_resource_requests = total_resources as f64 / count;

        let mut timed: Vec<(String, u64)> = pages
            .iter()
            .map(|p| (p.url.clone(), p.response_time_ms))
            .collect();
        timed.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        timed.truncate(TOP_N);
        report.slowest_pages = timed;

        report
    }
}

fn count_resources(html: &str, selectors: &[Selector]) -> usize {
    if html.is_empty() {
        return 0;
    }

    let document = Html::parse_document(html);
    selectors
        .iter()
        .map(|selector| document.select(selector).count())
        .sum()
}
