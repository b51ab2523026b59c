//! Crawl session state definitions
//!
//! A session moves Initializing → Crawling → Completed, or to Aborted when
//! the site cannot be reached.

use std::fmt;

/// Represents the lifecycle state of one crawl session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    /// Checking site availability and loading robots.txt
    Initializing,

    /// Working through the frontier
    Crawling,

    // ===== Terminal States =====
    /// Frontier exhausted or page cap reached
    Completed,

    /// Site unreachable; the session produced no further pages
    Aborted,
}

impl CrawlState {
    /// Returns true if this is a terminal state (no further transitions)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }

    /// Returns true if `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        matches!(
            (self, next),
            (Self::Initializing, Self::Crawling)
                | (Self::Initializing, Self::Aborted)
                | (Self::Crawling, Self::Completed)
                | (Self::Crawling, Self::Aborted)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Crawling => "crawling",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
