//! Year partitioning of holiday records.
//!
//! Groups records by year, writes one document per year and regenerates
//! the year index. A failed year is logged and skipped; the other years
//! and the index are still written.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::Result;
use crate::models::HolidayRecord;
use crate::storage::HolidayStorage;

/// Result of writing a batch of year documents.
#[derive(Debug, Default, Clone)]
pub struct PartitionOutcome {
    /// Years written successfully, most recent first
    pub written: Vec<String>,
    /// Years whose write failed, with the error message
    pub failed: Vec<(String, String)>,
    /// Contents of the index, if it was written
    pub index: Option<Vec<String>>,
}

impl PartitionOutcome {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty() || self.index.is_none()
    }
}

/// Writes year documents and the year index through a storage backend.
pub struct YearPartitionWriter<'a> {
    storage: &'a dyn HolidayStorage,
}

impl<'a> YearPartitionWriter<'a> {
    pub fn new(storage: &'a dyn HolidayStorage) -> Self {
        Self { storage }
    }

    /// Write one document per year, then the index.
    pub async fn write_all(&self, records: Vec<HolidayRecord>) -> PartitionOutcome {
        let mut outcome = PartitionOutcome::default();

        for (year, group) in group_by_year(records).into_iter().rev() {
            match self.storage.write_year(&year, &group).await {
                Ok(()) => outcome.written.push(year),
                Err(e) => {
                    log::error!("Failed to write {} year document: {}", year, e);
                    outcome.failed.push((year, e.to_string()));
                }
            }
        }

        match self.write_index(&outcome.written).await {
            Ok(index) => outcome.index = Some(index),
            Err(e) => log::error!("Failed to write year index: {}", e),
        }

        outcome
    }

    /// Regenerate the index from `current` plus the documents on disk.
    pub async fn write_index(&self, current: &[String]) -> Result<Vec<String>> {
        let on_disk = self.storage.list_years().await?;
        let years = build_year_index(current, &on_disk);
        self.storage.write_index(&years).await?;
        Ok(years)
    }
}

/// Group records by year, keeping input order within each year.
pub fn group_by_year(records: Vec<HolidayRecord>) -> BTreeMap<String, Vec<HolidayRecord>> {
    let mut groups: BTreeMap<String, Vec<HolidayRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.year.clone()).or_default().push(record);
    }
    groups
}

/// Deduplicated union of both year lists, most recent first.
pub fn build_year_index(current: &[String], on_disk: &[String]) -> Vec<String> {
    let years: BTreeSet<&String> = current.iter().chain(on_disk).collect();
    years.into_iter().rev().cloned().collect()
}
