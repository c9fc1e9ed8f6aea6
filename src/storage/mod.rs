//! Storage abstractions for year document persistence.
//!
//! ## Directory Structure
//!
//! ```text
//! {output_dir}/
//! ├── years.json    # Index: year strings, most recent first
//! ├── 2025.json     # One document per year
//! └── 2024.json
//! ```
//!
//! Every document is pretty-printed JSON with LF line endings and exactly
//! one trailing LF, so output is byte-for-byte reproducible.

pub mod local;
pub mod partition;
pub mod reader;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::models::HolidayRecord;
use crate::utils::normalize_line_endings;

// Re-export for convenience
pub use local::LocalStorage;
pub use partition::{PartitionOutcome, YearPartitionWriter, build_year_index, group_by_year};
pub use reader::{HolidayReader, YearCache};

/// File name of the year index document.
pub const INDEX_FILE: &str = "years.json";

/// Trait for year document storage backends.
#[async_trait]
pub trait HolidayStorage: Send + Sync {
    /// Write (or overwrite) the document for one year.
    async fn write_year(&self, year: &str, records: &[HolidayRecord]) -> Result<()>;

    /// Read the document for one year, `None` if it does not exist.
    async fn read_year(&self, year: &str) -> Result<Option<Vec<HolidayRecord>>>;

    /// Years that currently have a `YYYY.json` document, most recent first.
    async fn list_years(&self) -> Result<Vec<String>>;

    /// Write the year index document.
    async fn write_index(&self, years: &[String]) -> Result<()>;

    /// Read the year index document, empty if it does not exist.
    async fn read_index(&self) -> Result<Vec<String>>;
}

/// Serialize a value as a normalized JSON document.
pub fn encode_document<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_string_pretty(value)?;
    Ok(normalize_line_endings(&json))
}

/// Whether `year` is exactly four ASCII digits.
pub fn is_valid_year(year: &str) -> bool {
    year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit())
}

/// Document file name for a year.
pub fn year_file_name(year: &str) -> String {
    format!("{year}.json")
}

/// Year encoded in a `YYYY.json` file name.
pub fn year_from_file_name(name: &str) -> Option<&str> {
    name.strip_suffix(".json").filter(|stem| is_valid_year(stem))
}
