//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: lifecycle of a crawl session (initializing, crawling, completed, aborted)

mod crawl_state;

pub use crawl_state::CrawlState;
