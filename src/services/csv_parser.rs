// src/services/csv_parser.rs

//! Office calendar CSV parser.
//!
//! Turns the raw CSV download into [`HolidayRecord`]s in file order.

use std::collections::HashMap;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::{AppError, Result};
use crate::models::{HolidayRecord, is_valid_date};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Value of the `isHoliday` column meaning "yes".
const YES: &str = "是";

/// Columns every row must carry.
const COL_DATE: &str = "Date";
const COL_NAME: &str = "name";
const COL_IS_HOLIDAY: &str = "isHoliday";
const COL_CATEGORY: &str = "holidayCategory";
const COL_DESCRIPTION: &str = "description";

const REQUIRED_COLUMNS: [&str; 5] = [
    COL_DATE,
    COL_NAME,
    COL_IS_HOLIDAY,
    COL_CATEGORY,
    COL_DESCRIPTION,
];

/// Parser for the office calendar CSV.
#[derive(Debug, Default, Clone)]
pub struct HolidayCsvParser;

impl HolidayCsvParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a CSV file from disk.
    pub async fn parse_file(&self, path: impl AsRef<Path>) -> Result<Vec<HolidayRecord>> {
        let bytes = tokio::fs::read(path).await?;
        self.parse(&bytes)
    }

    /// Parse CSV bytes. Fails on the first malformed row.
    pub fn parse(&self, input: &[u8]) -> Result<Vec<HolidayRecord>> {
        let input = input.strip_prefix(UTF8_BOM).unwrap_or(input);

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(input);

        let columns = ColumnIndex::from_headers(reader.headers()?);
        let mut records = Vec::new();

        for row in reader.records() {
            let row = row.map_err(Self::row_error)?;
            records.push(Self::map_row(&columns, &row)?);
        }

        log::debug!("Parsed {} CSV rows", records.len());
        Ok(records)
    }

    /// Report an unreadable row against its line when the reader knows it.
    fn row_error(error: csv::Error) -> AppError {
        match error.position().map(|p| p.line()) {
            Some(line) => AppError::parse(line, error),
            None => AppError::Csv(error),
        }
    }

    fn map_row(columns: &ColumnIndex, row: &StringRecord) -> Result<HolidayRecord> {
        let line = row.position().map_or(0, |p| p.line());
        let field = |name: &str| {
            columns
                .get(row, name)
                .ok_or_else(|| AppError::parse(line, format!("missing column '{name}'")))
        };

        let date = field(COL_DATE)?;
        if !is_valid_date(date) {
            return Err(AppError::parse(
                line,
                format!("Date '{date}' must be exactly 8 digits"),
            ));
        }

        Ok(HolidayRecord::new(
            date,
            field(COL_NAME)?,
            field(COL_IS_HOLIDAY)? == YES,
            field(COL_CATEGORY)?,
            field(COL_DESCRIPTION)?,
        ))
    }
}

/// Case-insensitive header name to column position lookup.
struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Self {
        let mut positions = HashMap::new();
        for (idx, header) in headers.iter().enumerate() {
            positions.entry(header.to_lowercase()).or_insert(idx);
        }
        let missing: Vec<_> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| !positions.contains_key(&c.to_lowercase()))
            .collect();
        if !missing.is_empty() {
            log::warn!("CSV header is missing columns: {:?}", missing);
        }
        Self { positions }
    }

    fn get<'r>(&self, row: &'r StringRecord, name: &str) -> Option<&'r str> {
        let idx = *self.positions.get(&name.to_lowercase())?;
        row.get(idx)
    }
}
