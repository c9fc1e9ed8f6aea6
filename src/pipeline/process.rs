//! Re-annotation of year documents already on disk.

use serde::Serialize;

use crate::error::Result;
use crate::services::RelatedHolidayResolver;
use crate::storage::HolidayStorage;

/// Summary of one re-annotation pass.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ProcessReport {
    /// Years rewritten, most recent first
    pub files_updated: Vec<String>,
    /// Years skipped, with the error message
    pub files_failed: Vec<(String, String)>,
    pub notes_resolved: usize,
}

/// Re-run related-holiday resolution over every `YYYY.json` in `storage`.
///
/// A document that cannot be read or rewritten is logged and skipped. The
/// year index is left untouched.
pub async fn run_process(storage: &dyn HolidayStorage) -> Result<ProcessReport> {
    let years = storage.list_years().await?;
    let mut report = ProcessReport::default();

    if years.is_empty() {
        log::warn!("No year documents to process");
        return Ok(report);
    }

    let resolver = RelatedHolidayResolver::new();
    for year in years {
        let mut records = match storage.read_year(&year).await {
            Ok(Some(records)) => records,
            Ok(None) => {
                log::warn!("Year document {} disappeared before processing", year);
                report
                    .files_failed
                    .push((year, "document not found".to_string()));
                continue;
            }
            Err(e) => {
                log::error!("Failed to read year document {}: {}", year, e);
                report.files_failed.push((year, e.to_string()));
                continue;
            }
        };

        let notes = resolver.resolve(&mut records);
        log::debug!("Resolved {} note(s) for {}", notes, year);

        match storage.write_year(&year, &records).await {
            Ok(()) => {
                report.notes_resolved += notes;
                report.files_updated.push(year);
            }
            Err(e) => {
                log::error!("Failed to rewrite year document {}: {}", year, e);
                report.files_failed.push((year, e.to_string()));
            }
        }
    }

    log::info!(
        "Processed {} year document(s), {} failed",
        report.files_updated.len(),
        report.files_failed.len()
    );
    Ok(report)
}
