//! JSON page store
//!
//! Page records accumulate in memory during a crawl and are written as one
//! pretty-printed JSON array. Writes are a plain overwrite, not atomic.

use crate::storage::traits::{StorageError, StorageResult};
use crate::storage::PageRecord;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;

/// In-memory sequence of page records with file persistence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageStore {
    records: Vec<PageRecord>,
}

impl PageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing record sequence
    pub fn from_records(records: Vec<PageRecord>) -> Self {
        Self { records }
    }

    /// Appends a record; records keep insertion order
    pub fn push(&mut self, record: PageRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[PageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Writes all records to `path`
    ///
    /// Parent directories are created when missing. An existing file is
    /// overwritten.
    pub fn save(&self, path: &Path) -> StorageResult<()> {
        save_records(path, &self.records)
    }

    /// Reads a record file written by [`PageStore::save`]
    ///
    /// # Returns
    ///
    /// * `Ok(PageStore)` - Records in file order
    /// * `Err(StorageError::FileNotFound)` - No file at `path`
    /// * `Err(StorageError::SchemaInvalid)` - The file is not a page record array
    pub fn load(path: &Path) -> StorageResult<Self> {
        load_records(path).map(Self::from_records)
    }
}

/// Serializes a record slice to `path`
pub fn save_records(path: &Path, records: &[PageRecord]) -> StorageResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.flush()?;

    tracing::debug!("Saved {} page record(s) to {}", records.len(), path.display());
    Ok(())
}

/// Deserializes a record file
pub fn load_records(path: &Path) -> StorageResult<Vec<PageRecord>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(StorageError::FileNotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(e.into()),
    };

    let records: Vec<PageRecord> = serde_json::from_reader(BufReader::new(file)).map_err(
        |source| StorageError::SchemaInvalid {
            path: path.to_path_buf(),
            source,
        },
    )?;

    tracing::debug!("Loaded {} page record(s) from {}", records.len(), path.display());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn record(path: &str) -> PageRecord {
        let mut metadata = BTreeMap::new();
        metadata.insert("title".to_string(), format!("Page {}", path));
        PageRecord {
            url: format!("https://example.com{}", path),
            status_code: 200,
            fetched_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            html: "<html><body>Привет</body></html>".to_string(),
            extracted_links: vec!["https://example.com/a".to_string()],
            text_content: "Привет".to_string(),
            metadata,
            response_time_ms: 42,
        }
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/dir/scraped_data.json");

        let mut store = PageStore::new();
        store.push(record("/"));
        store.push(record("/a"));
        store.save(&path).unwrap();

        let loaded = PageStore::load(&path).unwrap();
        assert_eq!(loaded, store);
        assert_eq!(loaded.records()[1].url, "https://example.com/a");
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");

        PageStore::from_records(vec![record("/"), record("/a")])
            .save(&path)
            .unwrap();
        PageStore::from_records(vec![record("/b")]).save(&path).unwrap();

        let loaded = PageStore::load(&path).unwrap();
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = PageStore::load(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(StorageError::FileNotFound { .. })));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let result = PageStore::load(&path);
        assert!(matches!(result, Err(StorageError::SchemaInvalid { .. })));
    }

    #[test]
    fn test_load_wrong_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wrong.json");
        fs::write(&path, r#"[{"url": "https://example.com/", "status_code": "ok"}]"#).unwrap();

        let result = PageStore::load(&path);
        assert!(matches!(result, Err(StorageError::SchemaInvalid { .. })));
    }

    #[test]
    fn test_empty_store_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.json");
        PageStore::new().save(&path).unwrap();
        assert!(PageStore::load(&path).unwrap().is_empty());
    }
}
