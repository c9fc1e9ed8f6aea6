//! Holiday record data structure.

use serde::{Deserialize, Serialize};

/// Category substrings that mark a makeup-type entry
/// (makeup holiday, makeup workday, adjusted holiday).
const MAKEUP_CATEGORY_MARKERS: [&str; 3] = ["補假", "補行上班", "調整放假"];

/// One calendar entry from the office calendar feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HolidayRecord {
    /// Date as `YYYYMMDD`
    pub date: String,

    /// `date[0..4]`, kept alongside for consumers of the JSON documents
    pub year: String,

    /// Holiday name (may be empty)
    #[serde(default)]
    pub name: String,

    /// Whether the office is closed on this day
    #[serde(default)]
    pub is_holiday: bool,

    /// Category label (e.g. "放假之紀念日及節日", "補假", "星期六")
    #[serde(default)]
    pub holiday_category: String,

    /// Free-text description; the only place cross-references appear
    #[serde(default)]
    pub description: String,

    /// Name of the related holiday, filled in by the resolver
    #[serde(default)]
    pub note: Option<String>,
}

impl HolidayRecord {
    /// Build a record, deriving `year` from `date`.
    ///
    /// `date` is expected to be already validated as 8 ASCII digits.
    pub fn new(
        date: impl Into<String>,
        name: impl Into<String>,
        is_holiday: bool,
        holiday_category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let date = date.into();
        let year = date.get(..4).unwrap_or_default().to_string();
        Self {
            date,
            year,
            name: name.into(),
            is_holiday,
            holiday_category: holiday_category.into(),
            description: description.into(),
            note: None,
        }
    }

    /// Whether this entry needs its related holiday looked up.
    ///
    /// True for makeup/adjusted categories and for unnamed entries.
    pub fn is_makeup(&self) -> bool {
        MAKEUP_CATEGORY_MARKERS
            .iter()
            .any(|marker| self.holiday_category.contains(marker))
            || self.name.trim().is_empty()
    }

    /// Month and day parsed from the date, if it is well formed.
    pub fn month_day(&self) -> Option<(u32, u32)> {
        if self.date.len() != 8 {
            return None;
        }
        let month = self.date.get(4..6)?.parse().ok()?;
        let day = self.date.get(6..8)?.parse().ok()?;
        Some((month, day))
    }
}

/// Check that a date field is exactly 8 ASCII digits.
pub fn is_valid_date(date: &str) -> bool {
    date.len() == 8 && date.bytes().all(|b| b.is_ascii_digit())
}
