//! Storage module for persisting crawl data
//!
//! This module defines the page record produced for every successfully
//! fetched page and the store that accumulates and persists them.

mod page_store;
mod traits;

pub use page_store::{load_records, save_records, PageStore};
pub use traits::{StorageError, StorageResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Snapshot of one fetched page
///
/// Created once per successful fetch and never modified afterwards. Field
/// order here is the field order of the persisted JSON objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub status_code: u16,
    pub fetched_at: DateTime<Utc>,
    /// Raw HTML as received
    pub html: String,
    /// Absolute, normalized links in document order
    pub extracted_links: Vec<String>,
    pub text_content: String,
    /// Keys are those of [`crate::crawler::MetadataKey`]
    pub metadata: BTreeMap<String, String>,
    /// Time to fetch the page; 0 when read from files that predate the field
    #[serde(default)]
    pub response_time_ms: u64,
}

impl PageRecord {
    /// Returns a metadata value by key
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Size of the raw HTML in bytes
    pub fn page_size(&self) -> usize {
        self.html.len()
    }
}
