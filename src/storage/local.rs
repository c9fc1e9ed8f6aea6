//! Local filesystem storage implementation.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── years.json
//! └── YYYY.json
//! ```
//!
//! Writes go to a `.tmp` sibling first and are renamed into place, so a
//! reader never sees a half-written document.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::HolidayRecord;
use crate::storage::{
    HolidayStorage, INDEX_FILE, encode_document, year_file_name, year_from_file_name,
};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Root directory of this storage.
    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("json.tmp");
        let result = Self::stage_and_rename(&tmp, &path, bytes).await;
        if result.is_err() {
            match tokio::fs::remove_file(&tmp).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => log::warn!("Failed to remove staged file {}: {}", tmp.display(), e),
            }
        }
        result
    }

    async fn stage_and_rename(tmp: &Path, path: &Path, bytes: &[u8]) -> Result<()> {
        let mut file = tokio::fs::File::create(tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(tmp, path).await?;
        Ok(())
    }

    /// Write a normalized JSON document.
    async fn write_json<T: Serialize + ?Sized + Sync>(&self, key: &str, value: &T) -> Result<()> {
        let doc = encode_document(value)?;
        self.write_bytes(key, doc.as_bytes()).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl HolidayStorage for LocalStorage {
    async fn write_year(&self, year: &str, records: &[HolidayRecord]) -> Result<()> {
        let key = year_file_name(year);
        self.write_json(&key, records).await?;
        log::info!(
            "Wrote {} record(s) for {} to {}",
            records.len(),
            year,
            self.path(&key).display()
        );
        Ok(())
    }

    async fn read_year(&self, year: &str) -> Result<Option<Vec<HolidayRecord>>> {
        self.read_json(&year_file_name(year)).await
    }

    async fn list_years(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.root_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::Io(e)),
        };

        let mut years = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name();
            if let Some(year) = name.to_str().and_then(year_from_file_name) {
                years.push(year.to_string());
            }
        }
        years.sort_by(|a, b| b.cmp(a));
        Ok(years)
    }

    async fn write_index(&self, years: &[String]) -> Result<()> {
        self.write_json(INDEX_FILE, years).await?;
        log::info!(
            "Wrote year index ({} year(s)) to {}",
            years.len(),
            self.path(INDEX_FILE).display()
        );
        Ok(())
    }

    async fn read_index(&self) -> Result<Vec<String>> {
        Ok(self.read_json(INDEX_FILE).await?.unwrap_or_default())
    }
}
