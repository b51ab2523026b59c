//! Robots.txt rule parsing
//!
//! This is a small subset of the robots.txt grammar: only
//! `User-agent` and `Disallow` lines are interpreted, and rules are plain
//! path prefixes. Prefixes are stored percent-encoded, the same way
//! [`Url::path`] reports paths, so non-ASCII rules match.

use url::Url;

/// Disallowed path prefixes that apply to this crawler
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsRuleSet {
    disallowed: Vec<String>,
}

impl RobotsRuleSet {
    /// Creates an empty rule set that allows everything
    ///
    /// Used whenever robots.txt is missing, unreadable, or not respected.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Parses robots.txt content for the given identity token
    ///
    /// # Parsing Rules
    ///
    /// - `#` starts a comment; blank lines are ignored
    /// - Directive names are case-insensitive
    /// - Every `User-agent:` line resets the active flag: it becomes true when
    ///   the value is `*` or contains `identity` (case-insensitive)
    /// - While active, each `Disallow:` with a non-empty value adds a prefix
    /// - All other directives are ignored
    ///
    /// # Arguments
    ///
    /// * `content` - The raw robots.txt file content
    /// * `identity` - This crawler's product token, e.g. `siteauditor`
    pub fn parse(content: &str, identity: &str) -> Self {
        let identity = identity.to_lowercase();
        let mut active_for_us = false;
        let mut rules = Self::default();

        for line in content.lines() {
            let line = match line.split_once('#') {
                Some((before, _)) => before,
                None => line,
            }
            .trim();

            if line.is_empty() {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    let agent = value.to_lowercase();
                    active_for_us =
                        agent == "*" || (!agent.is_empty() && agent.contains(identity.as_str()));
                }
                "disallow" if active_for_us && !value.is_empty() => {
                    rules.add(value);
                }
                _ => {}
            }
        }

        rules
    }

    fn add(&mut self, value: &str) {
        let prefix = encode_prefix(value);
        if !self.disallowed.iter().any(|p| *p == prefix) {
            self.disallowed.push(prefix);
        }
    }

    /// Checks whether a URL may be fetched
    ///
    /// Returns false iff the URL's path starts with any disallowed prefix.
    pub fn is_allowed(&self, url: &Url) -> bool {
        self.is_path_allowed(url.path())
    }

    /// Checks a bare path (e.g. `/private/page`) against the rules
    pub fn is_path_allowed(&self, path: &str) -> bool {
        !self.disallowed.iter().any(|prefix| path.starts_with(prefix))
    }

    /// Disallowed prefixes in the order they were declared
    pub fn disallowed(&self) -> &[String] {
        &self.disallowed
    }

    pub fn len(&self) -> usize {
        self.disallowed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.disallowed.is_empty()
    }
}

/// Percent-encodes a rule path the way `url` encodes request paths
///
/// Rules that are not absolute paths are kept as written.
fn encode_prefix(value: &str) -> String {
    if !value.starts_with('/') {
        return value.to_string();
    }

    let base = match Url::parse("http://robots.invalid/") {
        Ok(base) => base,
        Err(_) => return value.to_string(),
    };
    match base.join(value) {
        Ok(joined) if !value.contains(&['?', '#'][..]) && !has_dot_segment(value) => {
            joined.path().to_string()
        }
        _ => value.to_string(),
    }
}

fn has_dot_segment(value: &str) -> bool {
    value.split('/').any(|segment| segment == "." || segment == "..")
}
