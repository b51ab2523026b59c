//! Robots.txt handling module
//!
//! This module fetches robots.txt once per crawl session and turns it into a
//! set of disallowed path prefixes. Failures are never fatal: the crawl
//! proceeds unrestricted.

mod parser;

pub use parser::RobotsRuleSet;

use reqwest::{Client, StatusCode};
use url::Url;

/// Fetches and parses robots.txt for the site rooted at `base_url`
///
/// # Arguments
///
/// * `client` - The shared HTTP client (carries the user agent and timeout)
/// * `base_url` - Root URL of the audited site
/// * `identity` - This crawler's robots.txt product token
///
/// # Returns
///
/// The parsed rules, or an empty rule set when robots.txt is not served with
/// status 200 or the request fails.
pub async fn load_robots(client: &Client, base_url: &Url, identity: &str) -> RobotsRuleSet {
    let robots_url = match base_url.join("/robots.txt") {
        Ok(u) => u,
        Err(e) => {
            tracing::warn!("Cannot build robots.txt URL from {}: {}", base_url, e);
            return RobotsRuleSet::allow_all();
        }
    };

    tracing::debug!("Fetching {}", robots_url);

    let response = match client.get(robots_url.clone()).send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("Failed to fetch {}: {}", robots_url, e);
            return RobotsRuleSet::allow_all();
        }
    };

    if response.status() != StatusCode::OK {
        tracing::warn!(
            "robots.txt returned HTTP {}; crawling without restrictions",
            response.status().as_u16()
        );
        return RobotsRuleSet::allow_all();
    }

    match response.text().await {
        Ok(content) => {
            let rules = RobotsRuleSet::parse(&content, identity);
            tracing::info!(
                "Loaded robots.txt: {} disallowed path(s)",
                rules.len()
            );
            rules
        }
        Err(e) => {
            tracing::warn!("Failed to read robots.txt body: {}", e);
            RobotsRuleSet::allow_all()
        }
    }
}
