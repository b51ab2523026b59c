//! Site structure analysis

use crate::analysis::TOP_N;
use crate::storage::PageRecord;
use crate::url::same_host;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use url::Url;

/// Link graph and URL layout of the crawled pages
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructureReport {
    pub total_pages: usize,

    /// HTTP status code -> page count
    pub status_codes: BTreeMap<u16, usize>,

    /// Number of path segments -> page count
    pub depth_distribution: BTreeMap<usize, usize>,

    /// Links pointing at the audited host, summed over all pages
    pub internal_links: usize,

    /// Links pointing anywhere else
    pub external_links: usize,

    /// Internal targets with the most linking pages, highest first
    pub top_linked_pages: Vec<(String, usize)>,

    /// Crawled pages no other crawled page links to; the first page is exempt
    pub orphan_pages: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StructureAnalyzer;

impl StructureAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Builds the structure report
    ///
    /// Inbound counts are per linking page: a page linking twice to the same
    /// target counts once, a page linking to itself not at all.
    pub fn analyze(&self, pages: &[PageRecord]) -> StructureReport {
        let mut report = StructureReport {
            total_pages: pages.len(),
            ..Default::default()
        };

        let mut inbound: HashMap<String, usize> = HashMap::new();

        for page in pages {
            *report.status_codes.entry(page.status_code).or_insert(0) += 1;

            let Ok(page_url) = Url::parse(&page.url) else {
                tracing::debug!("Skipping unparseable record URL {}", page.url);
                continue;
            };

            *report.depth_distribution.entry(path_depth(&page_url)).or_insert(0) += 1;

            let mut targets = HashSet::new();
            for link in &page.extracted_links {
                let internal = Url::parse(link)
                    .map(|target| same_host(&target, &page_url))
                    .unwrap_or(false);

                if internal {
                    report.internal_links += 1;
                    if link != &page.url {
                        targets.insert(link.as_str());
                    }
                } else {
                    report.external_links += 1;
                }
            }

            for target in targets {
                *inbound.entry(target.to_string()).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = inbound
            .iter()
            .map(|(url, count)| (url.clone(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(TOP_N);
        report.top_linked_pages = ranked;

        report.orphan_pages = pages
            .iter()
            .skip(1)
            .filter(|page| !inbound.contains_key(&page.url))
            .map(|page| page.url.clone())
            .collect();

        report
    }
}

/// Non-empty path segments of `url`; the root has depth 0
fn path_depth(url: &Url) -> usize {
    url.path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).count())
        .unwrap_or(0)
}
