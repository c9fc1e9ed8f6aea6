// src/services/related.rs

//! Related holiday resolution.
//!
//! Makeup days (補假, 補行上班, 調整放假) and unnamed entries usually carry no
//! explanation of their own. The explanation lives in another entry of the
//! same year, whose description mentions the makeup date, e.g.
//! "於10月24日補假". The resolver finds that entry and copies its name into
//! the makeup entry's `note`.
//!
//! Matching is first-found in input order, not best-found: when two entries
//! mention the same date, the earlier one wins.

use std::collections::BTreeMap;

use regex::Regex;

use crate::models::HolidayRecord;
use crate::utils::to_chinese_numeral;

/// Matcher for "M月D日" mentions of one calendar date.
///
/// Month and day each accept the plain number, the zero-padded number or
/// the Chinese spelling, in any combination, with optional whitespace
/// around 月 and 日.
#[derive(Debug, Clone)]
pub struct DateMention {
    pattern: Regex,
}

impl DateMention {
    pub fn new(month: u32, day: u32) -> Option<Self> {
        let pattern = format!(
            r"(?:{})\s*月\s*(?:{})\s*日",
            Self::renderings(month),
            Self::renderings(day)
        );
        match Regex::new(&pattern) {
            Ok(pattern) => Some(Self { pattern }),
            Err(e) => {
                log::warn!("Invalid date mention pattern {}: {}", pattern, e);
                None
            }
        }
    }

    /// Whether `text` mentions this date.
    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    fn renderings(value: u32) -> String {
        [
            value.to_string(),
            format!("{value:02}"),
            to_chinese_numeral(value),
        ]
        .iter()
        .map(|s| regex::escape(s))
        .collect::<Vec<_>>()
        .join("|")
    }
}

/// Fills `note` on makeup-type records from same-year cross references.
#[derive(Debug, Default, Clone)]
pub struct RelatedHolidayResolver;

impl RelatedHolidayResolver {
    pub fn new() -> Self {
        Self
    }

    /// Annotate `records` in place. Returns the number of notes set.
    ///
    /// Records are only compared with records of the same year. Malformed
    /// dates are skipped. Records without a match keep their current note.
    pub fn resolve(&self, records: &mut [HolidayRecord]) -> usize {
        let mut by_year: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (idx, record) in records.iter().enumerate() {
            by_year.entry(record.year.as_str()).or_default().push(idx);
        }

        let mut found = Vec::new();
        for indices in by_year.values() {
            for &target in indices {
                if let Some(name) = Self::find_related(records, indices, target) {
                    found.push((target, name));
                }
            }
        }

        let annotated = found.len();
        for (target, name) in found {
            log::debug!("{} -> {}", records[target].date, name);
            records[target].note = Some(name);
        }
        annotated
    }

    /// Name of the first other record in `year_indices` whose description
    /// mentions the target's date.
    fn find_related(
        records: &[HolidayRecord],
        year_indices: &[usize],
        target: usize,
    ) -> Option<String> {
        let record = &records[target];
        if !record.is_makeup() {
            return None;
        }
        let (month, day) = record.month_day()?;
        let mention = DateMention::new(month, day)?;

        year_indices
            .iter()
            .filter(|&&idx| idx != target)
            .map(|&idx| &records[idx])
            .find(|source| {
                !source.description.is_empty()
                    && !source.name.is_empty()
                    && mention.is_match(&source.description)
            })
            .map(|source| source.name.clone())
    }
}
