//! Holiday ingestion: download, parse, resolve, write.
//!
//! The CSV is streamed to a transient file before parsing. That file is
//! removed on every exit path, including download and parse failures.

use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{HolidayRecord, SourceConfig};
use crate::pipeline::PipelineStage;
use crate::services::{HolidayCsvParser, RelatedHolidayResolver};
use crate::storage::{HolidayStorage, YearPartitionWriter};

const TEMP_PREFIX: &str = "holiday_data_";
const TEMP_SUFFIX: &str = ".csv";

/// Summary of one ingestion run.
#[derive(Debug, Clone, Serialize)]
pub struct FetchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub bytes_downloaded: u64,
    pub record_count: usize,
    pub notes_resolved: usize,
    /// Years written, most recent first
    pub years_written: Vec<String>,
    /// Years whose write failed, with the error message
    pub years_failed: Vec<(String, String)>,
    /// Index contents, `None` if the index write failed
    pub index_years: Option<Vec<String>>,
    pub stage: PipelineStage,
}

/// Tracks the current stage and logs every transition.
#[derive(Debug)]
struct StageTracker {
    current: PipelineStage,
}

impl StageTracker {
    fn new() -> Self {
        Self {
            current: PipelineStage::Idle,
        }
    }

    fn advance(&mut self, next: PipelineStage) {
        log::debug!("Pipeline stage: {} -> {}", self.current, next);
        self.current = next;
    }
}

/// What the stages before cleanup produced.
struct Ingested {
    bytes: u64,
    records: usize,
    notes: usize,
    written: Vec<String>,
    failed: Vec<(String, String)>,
    index: Option<Vec<String>>,
}

/// Run one ingestion against `storage`.
///
/// Download and parse failures abort the run with an error once the
/// transient file has been removed. Per-year write failures do not; they
/// are listed in the returned report.
pub async fn run_fetch(
    source: &SourceConfig,
    storage: &dyn HolidayStorage,
    client: &reqwest::Client,
) -> Result<FetchReport> {
    let started_at = Utc::now();
    let mut stage = StageTracker::new();
    log::info!("Holiday ingestion starting");

    stage.advance(PipelineStage::Downloading);
    let url = match Url::parse(&source.url) {
        Ok(url) => url,
        Err(e) => {
            stage.advance(PipelineStage::Failed);
            log::error!("Invalid source URL {:?}: {}", source.url, e);
            return Err(AppError::download(&source.url, e));
        }
    };

    let temp = match create_temp_file(source.temp_dir.as_deref()) {
        Ok(temp) => temp,
        Err(e) => {
            stage.advance(PipelineStage::Failed);
            log::error!("Could not create a temporary file: {}", e);
            return Err(e);
        }
    };

    let result = ingest(&url, &temp, storage, client, &mut stage).await;

    stage.advance(PipelineStage::Cleanup);
    remove_temp_file(temp);

    match result {
        Ok(done) => {
            stage.advance(PipelineStage::Done);
            let report = FetchReport {
                started_at,
                finished_at: Utc::now(),
                bytes_downloaded: done.bytes,
                record_count: done.records,
                notes_resolved: done.notes,
                years_written: done.written,
                years_failed: done.failed,
                index_years: done.index,
                stage: stage.current,
            };
            log::info!(
                "Holiday ingestion complete: {} record(s), {} year(s) written, {} failed",
                report.record_count,
                report.years_written.len(),
                report.years_failed.len()
            );
            Ok(report)
        }
        Err(e) => {
            stage.advance(PipelineStage::Failed);
            log::error!("Holiday ingestion failed: {}", e);
            Err(e)
        }
    }
}

async fn ingest(
    url: &Url,
    temp: &Path,
    storage: &dyn HolidayStorage,
    client: &reqwest::Client,
    stage: &mut StageTracker,
) -> Result<Ingested> {
    let bytes = download_to(client, url, temp)
        .await
        .map_err(|e| AppError::download(url.as_str(), e))?;
    log::info!("Downloaded {} byte(s) from {}", bytes, url);

    stage.advance(PipelineStage::Parsing);
    let mut records: Vec<HolidayRecord> = HolidayCsvParser::new().parse_file(temp).await?;
    log::info!("Parsed {} holiday record(s)", records.len());

    stage.advance(PipelineStage::Resolving);
    let notes = RelatedHolidayResolver::new().resolve(&mut records);
    log::info!("Resolved {} related holiday note(s)", notes);

    stage.advance(PipelineStage::Writing);
    let count = records.len();
    let outcome = YearPartitionWriter::new(storage).write_all(records).await;
    if outcome.has_failures() {
        log::warn!(
            "Partial write: {} year(s) failed, index {}",
            outcome.failed.len(),
            if outcome.index.is_some() { "written" } else { "not written" }
        );
    }

    Ok(Ingested {
        bytes,
        records: count,
        notes,
        written: outcome.written,
        failed: outcome.failed,
        index: outcome.index,
    })
}

/// Stream the response body into `dest`, returning the byte count.
async fn download_to(client: &reqwest::Client, url: &Url, dest: &Path) -> Result<u64> {
    let mut response = client.get(url.clone()).send().await?.error_for_status()?;
    let mut file = tokio::fs::File::create(dest).await?;

    let mut total = 0u64;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        total += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(total)
}

fn create_temp_file(dir: Option<&Path>) -> Result<TempPath> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(TEMP_PREFIX).suffix(TEMP_SUFFIX);
    let file = match dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };
    Ok(file.into_temp_path())
}

fn remove_temp_file(temp: TempPath) {
    let path = temp.to_path_buf();
    match temp.close() {
        Ok(()) => log::debug!("Removed temporary file {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => log::warn!(
            "Failed to remove temporary file {}: {}",
            path.display(),
            e
        ),
    }
}
