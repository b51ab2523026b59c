//! HTML parser for extracting links, visible text and metadata
//!
//! Parsing is permissive: `scraper` repairs malformed markup the way browsers
//! do, so this module never fails. Worst case it returns empty extractions.

use crate::url::normalize_url;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::{BTreeMap, HashSet};
use url::Url;

/// Elements whose text is never visible
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Metadata keys recognized in a page record
///
/// The set is closed: analyzers rely on exactly these keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataKey {
    /// `<title>` text
    Title,
    /// `<meta name="description">` content
    Description,
    /// `<meta name="keywords">` content
    Keywords,
    /// `<h1>` texts, one per line
    H1,
    /// `<h2>` texts, one per line
    H2,
    /// `<h3>` texts, one per line
    H3,
    /// `<meta name="viewport">` content
    Viewport,
    /// `<link rel="canonical">` target
    Canonical,
}

impl MetadataKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Keywords => "keywords",
            Self::H1 => "h1",
            Self::H2 => "h2",
            Self::H3 => "h3",
            Self::Viewport => "viewport",
            Self::Canonical => "canonical",
        }
    }

    pub fn all() -> [Self; 8] {
        [
            Self::Title,
            Self::Description,
            Self::Keywords,
            Self::H1,
            Self::H2,
            Self::H3,
            Self::Viewport,
            Self::Canonical,
        ]
    }

    /// Heading keys, outermost first
    pub fn headings() -> [Self; 3] {
        [Self::H1, Self::H2, Self::H3]
    }
}

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Absolute, normalized links in document order, without duplicates
    pub links: Vec<String>,

    /// Visible text, whitespace collapsed
    pub text_content: String,

    /// Recognized metadata; absent keys were not found on the page
    pub metadata: BTreeMap<String, String>,
}

/// Parses HTML content and extracts links, text and metadata
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document, in document order
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links (same page anchors)
///
/// # Example
///
/// ```
/// use site_auditor::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.metadata.get("title").map(String::as_str), Some("Test"));
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_html(html: &str, current_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        links: extract_links(&document, current_url),
        text_content: extract_text(&document),
        metadata: extract_metadata(&document, current_url),
    }
}

/// Convenience function for extracting just the links from HTML
pub fn extract_links_simple(html: &str, current_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    extract_links(&document, current_url)
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Extracts all valid links from the HTML document
fn extract_links(document: &Html, current_url: &Url) -> Vec<String> {
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    let mut push = |href: &str| {
        if let Some(absolute_url) = resolve_link(href, current_url) {
            if seen.insert(absolute_url.clone()) {
                links.push(absolute_url);
            }
        }
    };

    if let Some(a_selector) = selector("a[href]") {
        for element in document.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }
            if let Some(href) = element.value().attr("href") {
                push(href);
            }
        }
    }

    links
}

/// Resolves a link href to an absolute, normalized URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    normalize_url(absolute_url.as_str())
        .ok()
        .map(|u| u.to_string())
}

/// Extracts visible text, skipping script/style content
fn extract_text(document: &Html) -> String {
    let root = selector("body")
        .and_then(|body| document.select(&body).next())
        .unwrap_or_else(|| document.root_element());

    let mut words: Vec<&str> = Vec::new();
    collect_text(root, &mut words);
    words.join(" ")
}

fn collect_text<'a>(element: ElementRef<'a>, words: &mut Vec<&'a str>) {
    if HIDDEN_ELEMENTS.contains(&element.value().name()) {
        return;
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => words.extend(text.split_whitespace()),
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, words);
                }
            }
            _ => {}
        }
    }
}

fn extract_metadata(document: &Html, current_url: &Url) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();

    let mut insert = |key: MetadataKey, value: Option<String>| {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            metadata.insert(key.as_str().to_string(), v);
        }
    };

    insert(MetadataKey::Title, first_text(document, "title"));
    insert(
        MetadataKey::Description,
        meta_content(document, "meta[name='description']"),
    );
    insert(
        MetadataKey::Keywords,
        meta_content(document, "meta[name='keywords']"),
    );
    insert(
        MetadataKey::Viewport,
        meta_content(document, "meta[name='viewport']"),
    );
    insert(
        MetadataKey::Canonical,
        selector("link[rel='canonical'][href]")
            .and_then(|s| document.select(&s).next())
            .and_then(|e| e.value().attr("href"))
            .and_then(|href| current_url.join(href.trim()).ok())
            .map(|u| u.to_string()),
    );

    for key in MetadataKey::headings() {
        let texts: Vec<String> = selector(key.as_str())
            .map(|s| {
                document
                    .select(&s)
                    .map(element_text)
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        insert(key, Some(texts.join("\n")));
    }

    metadata
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

fn first_text(document: &Html, css: &str) -> Option<String> {
    let s = selector(css)?;
    document.select(&s).next().map(element_text)
}

fn meta_content(document: &Html, css: &str) -> Option<String> {
    let s = selector(css)?;
    document
        .select(&s)
        .next()
        .and_then(|e| e.value().attr("content"))
        .map(|c| c.trim().to_string())
}
