//! On-page SEO analysis
//!
//! Keyword matching is case-insensitive substring matching on the extracted
//! text and metadata. Length limits are counted in characters, not bytes.

use crate::crawler::MetadataKey;
use crate::storage::PageRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// Titles longer than this are usually truncated in search results
pub const MAX_TITLE_LENGTH: usize = 60;

/// Descriptions longer than this are usually truncated in search results
pub const MAX_DESCRIPTION_LENGTH: usize = 160;

/// Coverage of one configured keyword
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KeywordStats {
    pub keyword: String,
    /// Pages mentioning the keyword anywhere in text, title, description or headings
    pub pages_with_keyword: usize,
    pub in_titles: usize,
    pub in_descriptions: usize,
    pub in_headings: usize,
    /// Non-overlapping occurrences in page text, summed over all pages
    pub total_occurrences: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeoReport {
    pub keywords: Vec<KeywordStats>,
    pub missing_title: Vec<String>,
    pub missing_description: Vec<String>,
    pub missing_h1: Vec<String>,
    /// (url, title length)
    pub long_titles: Vec<(String, usize)>,
    /// (url, description length)
    pub long_descriptions: Vec<(String, usize)>,
    /// Title shared by several pages, with those pages in crawl order
    pub duplicate_titles: Vec<(String, Vec<String>)>,
}

impl SeoReport {
    /// Number of pages with at least one metadata problem
    pub fn pages_with_issues(&self) -> usize {
        let mut urls: Vec<&str> = self
            .missing_title
            .iter()
            .chain(&self.missing_description)
            .chain(&self.missing_h1)
            .map(String::as_str)
            .chain(self.long_titles.iter().map(|(u, _)| u.as_str()))
            .chain(self.long_descriptions.iter().map(|(u, _)| u.as_str()))
            .collect();
        urls.sort_unstable();
        urls.dedup();
        urls.len()
    }
}

/// Checks pages against a fixed keyword list
#[derive(Debug, Clone, Default)]
pub struct SeoAnalyzer {
    keywords: Vec<String>,
}

impl SeoAnalyzer {
    pub fn new(keywords: Vec<String>) -> Self {
        Self { keywords }
    }

    pub fn analyze(&self, pages: &[PageRecord]) -> SeoReport {
        let mut report = SeoReport {
            keywords: self.keywords.iter().map(|k| self.keyword_stats(k, pages)).collect(),
            ..Default::default()
        };

        let mut titles: BTreeMap<&str, Vec<String>> = BTreeMap::new();

        for page in pages {
            match non_blank(page.meta(MetadataKey::Title.as_str())) {
                None => report.missing_title.push(page.url.clone()),
                Some(title) => {
                    let length = title.chars().count();
                    if length > MAX_TITLE_LENGTH {
                        report.long_titles.push((page.url.clone(), length));
                    }
                    titles.entry(title).or_default().push(page.url.clone());
                }
            }

            match non_blank(page.meta(MetadataKey::Description.as_str())) {
                None => report.missing_description.push(page.url.clone()),
                Some(description) => {
                    let length = description.chars().count();
                    if length > MAX_DESCRIPTION_LENGTH {
                        report.long_descriptions.push((page.url.clone(), length));
                    }
                }
            }

            if non_blank(page.meta(MetadataKey::H1.as_str())).is_none() {
                report.missing_h1.push(page.url.clone());
            }
        }

        report.duplicate_titles = titles
            .into_iter()
            .filter(|(_, urls)| urls.len() > 1)
            .map(|(title, urls)| (title.to_string(), urls))
            .collect();

        report
    }

    fn keyword_stats(&self, keyword: &str, pages: &[PageRecord]) -> KeywordStats {
        let needle = keyword.to_lowercase();
        let mut stats = KeywordStats {
            keyword: keyword.to_string(),
            ..Default::default()
        };

        if needle.trim().is_empty() {
            return stats;
        }

        for page in pages {
            let contains = |key: MetadataKey| {
                page.meta(key.as_str())
                    .map(|v| v.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            };

            let in_title = contains(MetadataKey::Title);
            let in_description = contains(MetadataKey::Description);
            let in_headings = MetadataKey::headings().into_iter().any(contains);
            let occurrences = page.text_content.to_lowercase().matches(&needle).count();

            stats.in_titles += usize::from(in_title);
            stats.in_descriptions += usize::from(in_description);
            stats.in_headings += usize::from(in_headings);
            stats.total_occurrences += occurrences;

            if occurrences > 0 || in_title || in_description || in_headings {
                stats.pages_with_keyword += 1;
            }
        }

        stats
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
