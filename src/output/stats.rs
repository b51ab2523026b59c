//! Statistics for a single crawl session
//!
//! The coordinator updates these counters as it works through the frontier;
//! the CLI prints them when the crawl ends.

use crate::crawler::FailureKind;
use std::collections::BTreeMap;
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlStatistics {
    /// URLs popped from the frontier and fetched
    pub attempted: u64,

    /// Pages fetched and recorded
    pub fetched: u64,

    /// URLs skipped because robots.txt disallows them
    pub skipped_by_robots: u64,

    /// Failed fetches by failure label (`timeout`, `http_404`, ...)
    pub failures: BTreeMap<String, u64>,

    /// URLs still queued when the page cap stopped the crawl
    pub left_in_frontier: u64,

    /// Wall-clock duration of the session
    pub elapsed: Duration,
}

impl CrawlStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_failure(&mut self, kind: FailureKind) {
        *self.failures.entry(kind.label()).or_insert(0) += 1;
    }

    pub fn total_failures(&self) -> u64 {
        self.failures.values().sum()
    }

    /// Percentage of attempted URLs that produced a page record
    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            (self.fetched as f64 / self.attempted as f64) * 100.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  URLs attempted: {}", stats.attempted);
    println!("  Pages recorded: {}", stats.fetched);
    println!("  Skipped by robots.txt: {}", stats.skipped_by_robots);
    println!("  Left in frontier: {}", stats.left_in_frontier);
    println!("  Duration: {:.1}s", stats.elapsed.as_secs_f64());
    println!();

    if !stats.failures.is_empty() {
        println!("Failures:");
        let mut failure_counts: Vec<_> = stats.failures.iter().collect();
        failure_counts.sort_by(|a, b| b.1.cmp(a.1));

        for (kind, count) in failure_counts {
            println!("  {}: {}", kind, count);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} URLs recorded)",
        stats.success_rate(),
        stats.fetched,
        stats.attempted
    );
}
