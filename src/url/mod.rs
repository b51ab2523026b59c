//! URL handling module for Site-Auditor
//!
//! This module provides URL normalization, host extraction, and the in-scope
//! filter that decides whether a discovered link may enter the frontier.

mod domain;
mod normalize;

use std::collections::HashSet;
use url::Url;

// Re-export main functions
pub use domain::{extract_domain, same_host};
pub use normalize::normalize_url;

/// Decides whether a discovered URL should be crawled
///
/// A URL is in scope when all of the following hold:
/// 1. It parses and normalizes (malformed URLs are rejected, never raised)
/// 2. Its scheme is http or https
/// 3. Its host equals the base URL's host (no subdomains, no other sites)
/// 4. Its normalized form is not already in `visited`
///
/// # Arguments
///
/// * `url` - The candidate URL, absolute
/// * `base_url` - Root URL of the audited site
/// * `visited` - Normalized URLs already enqueued during this session
///
/// # Examples
///
/// ```
/// use std::collections::HashSet;
/// use url::Url;
/// use site_auditor::url::is_in_scope;
///
/// let base = Url::parse("https://example.com/").unwrap();
/// let visited = HashSet::new();
/// assert!(is_in_scope("https://example.com/about", &base, &visited));
/// assert!(!is_in_scope("https://other.com/about", &base, &visited));
/// assert!(!is_in_scope("mailto:team@example.com", &base, &visited));
/// ```
pub fn is_in_scope(url: &str, base_url: &Url, visited: &HashSet<String>) -> bool {
    let normalized = match normalize_url(url) {
        Ok(n) => n,
        Err(e) => {
            tracing::trace!("Rejecting {}: {}", url, e);
            return false;
        }
    };

    same_host(&normalized, base_url) && !visited.contains(normalized.as_str())
}
