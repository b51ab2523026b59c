//! Report types
//!
//! This module defines the data handed to the report generator and the
//! errors it can raise.

use crate::analysis::{PerformanceReport, SeoReport, StructureReport};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during report generation
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Invalid report template {}: {message}", .path.display())]
    Template { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for report operations
pub type ReportResult<T> = Result<T, ReportError>;

/// Everything a report is rendered from
///
/// Sections are `None` when the corresponding analyzer did not run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportData {
    pub site_url: String,
    /// Local time, `YYYY-MM-DD HH:MM:SS`
    pub date: String,
    pub pages_count: usize,
    /// SHA-256 of the configuration file the run used
    pub config_hash: String,
    pub structure: Option<StructureReport>,
    pub seo: Option<SeoReport>,
    pub performance: Option<PerformanceReport>,
}
