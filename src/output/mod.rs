//! Output module for crawl statistics and audit reports
//!
//! This module handles:
//! - Rendering analysis results into a markdown report
//! - Recording and printing crawl statistics

mod markdown;
pub mod stats;
mod traits;

pub use markdown::{
    format_performance, format_seo, format_structure, ReportGenerator, PLACEHOLDERS,
    SECTION_UNAVAILABLE,
};
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{ReportData, ReportError, ReportResult};
