//! Analysis module deriving audit summaries from page records
//!
//! Every analyzer is a pure function of the crawled pages; none of them
//! touches the network.
//!
//! # Components
//!
//! - `StructureAnalyzer`: status codes, URL depth, internal linking
//! - `SeoAnalyzer`: keyword coverage and on-page metadata problems
//! - `PerformanceAnalyzer`: response times, page weight, mobile readiness

mod performance;
mod seo;
mod structure;

pub use performance::{PerformanceAnalyzer, PerformanceReport};
pub use seo::{KeywordStats, SeoAnalyzer, SeoReport, MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH};
pub use structure::{StructureAnalyzer, StructureReport};

/// Entries kept in ranked lists (most linked, slowest, ...)
pub const TOP_N: usize = 10;
