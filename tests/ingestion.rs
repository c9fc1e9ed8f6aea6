// Ingestion runs against a mock calendar server.
use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use holiday_feed::error::{AppError, Result};
use holiday_feed::models::{HolidayRecord, SourceConfig};
use holiday_feed::pipeline::{PipelineStage, run_fetch};
use holiday_feed::storage::{HolidayReader, HolidayStorage, LocalStorage};
use holiday_feed::utils::http::create_download_client;
use mockito::Server;
use tempfile::TempDir;

const CALENDAR_CSV: &str = "Date,name,isHoliday,holidayCategory,description\r\n\
20241024,光復節,是,放假之紀念日及節日,因10月25日與10月24日對調\r\n\
20241025,,是,調整放假日,與10月24日對調\r\n\
20241026,,是,補假,\r\n\
20250101,開國紀念日,是,放假之紀念日及節日,全國各機關學校放假一日\r\n";

fn source(url: String, temp_dir: &TempDir) -> SourceConfig {
    SourceConfig {
        url,
        temp_dir: Some(temp_dir.path().to_path_buf()),
        ..SourceConfig::default()
    }
}

fn is_empty_dir(dir: &TempDir) -> bool {
    std::fs::read_dir(dir.path()).unwrap().next().is_none()
}

#[tokio::test]
async fn test_fetch_writes_years_notes_and_index() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/calendar.csv")
        .with_status(200)
        .with_header("content-type", "text/csv; charset=utf-8")
        .with_body(CALENDAR_CSV)
        .create_async()
        .await;

    let scratch = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    std::fs::write(out.path().join("2019.json"), "[]\n").unwrap();

    let source = source(format!("{}/calendar.csv", server.url()), &scratch);
    let client = create_download_client(&source).unwrap();
    let storage = LocalStorage::new(out.path());

    let report = run_fetch(&source, &storage, &client).await.unwrap();
    mock.assert_async().await;

    assert_eq!(report.stage, PipelineStage::Done);
    assert_eq!(report.record_count, 4);
    assert_eq!(report.notes_resolved, 1);
    assert_eq!(report.years_written, vec!["2025", "2024"]);
    assert!(report.years_failed.is_empty());
    assert!(report.bytes_downloaded > 0);

    let index = std::fs::read_to_string(out.path().join("years.json")).unwrap();
    assert_eq!(index, "[\n  \"2025\",\n  \"2024\",\n  \"2019\"\n]\n");

    let raw = std::fs::read_to_string(out.path().join("2024.json")).unwrap();
    assert!(!raw.contains('\r'));
    assert!(raw.ends_with("]\n"));
    assert!(!raw.ends_with("]\n\n"));

    let records: Vec<HolidayRecord> = serde_json::from_str(&raw).unwrap();
    let dates: Vec<_> = records.iter().map(|r| r.date.as_str()).collect();
    assert_eq!(dates, vec!["20241024", "20241025", "20241026"]);
    assert_eq!(records[0].note, None);
    assert_eq!(records[1].note.as_deref(), Some("光復節"));
    assert_eq!(records[2].note, None);

    assert!(is_empty_dir(&scratch));
}

#[tokio::test]
async fn test_fetch_is_reproducible() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/calendar.csv")
        .with_status(200)
        .with_body(CALENDAR_CSV)
        .expect(2)
        .create_async()
        .await;

    let scratch = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let source = source(format!("{}/calendar.csv", server.url()), &scratch);
    let client = create_download_client(&source).unwrap();
    let storage = LocalStorage::new(out.path());

    run_fetch(&source, &storage, &client).await.unwrap();
    let first = std::fs::read(out.path().join("2024.json")).unwrap();
    run_fetch(&source, &storage, &client).await.unwrap();
    let second = std::fs::read(out.path().join("2024.json")).unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_http_error_aborts_and_cleans_up() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/calendar.csv")
        .with_status(404)
        .create_async()
        .await;

    let scratch = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let source = source(format!("{}/calendar.csv", server.url()), &scratch);
    let client = create_download_client(&source).unwrap();
    let storage = LocalStorage::new(out.path());

    let err = run_fetch(&source, &storage, &client).await.unwrap_err();

    assert!(matches!(err, AppError::Download { .. }));
    assert!(is_empty_dir(&scratch));
    assert!(is_empty_dir(&out));
}

#[tokio::test]
async fn test_unreachable_source_aborts_and_cleans_up() {
    let scratch = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let source = source("http://127.0.0.1:9/calendar.csv".to_string(), &scratch);
    let client = create_download_client(&source).unwrap();
    let storage = LocalStorage::new(out.path());

    let err = run_fetch(&source, &storage, &client).await.unwrap_err();

    assert!(matches!(err, AppError::Download { .. }));
    assert!(is_empty_dir(&scratch));
}

#[tokio::test]
async fn test_malformed_row_aborts_without_writing() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/calendar.csv")
        .with_status(200)
        .with_body(
            "Date,name,isHoliday,holidayCategory,description\n\
             20240101,開國紀念日,是,放假之紀念日及節日,\n\
             2024-02-28,和平紀念日,是,放假之紀念日及節日,\n",
        )
        .create_async()
        .await;

    let scratch = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let source = source(format!("{}/calendar.csv", server.url()), &scratch);
    let client = create_download_client(&source).unwrap();
    let storage = LocalStorage::new(out.path());

    let err = run_fetch(&source, &storage, &client).await.unwrap_err();

    assert!(matches!(err, AppError::Parse { line: 3, .. }), "{err}");
    assert!(is_empty_dir(&scratch));
    assert!(is_empty_dir(&out));
}

/// Local storage that refuses to write selected years.
struct FlakyStorage {
    inner: LocalStorage,
    broken: HashMap<String, String>,
}

#[async_trait]
impl HolidayStorage for FlakyStorage {
    async fn write_year(&self, year: &str, records: &[HolidayRecord]) -> Result<()> {
        if let Some(reason) = self.broken.get(year) {
            return Err(AppError::Io(std::io::Error::other(reason.clone())));
        }
        self.inner.write_year(year, records).await
    }

    async fn read_year(&self, year: &str) -> Result<Option<Vec<HolidayRecord>>> {
        self.inner.read_year(year).await
    }

    async fn list_years(&self) -> Result<Vec<String>> {
        self.inner.list_years().await
    }

    async fn write_index(&self, years: &[String]) -> Result<()> {
        self.inner.write_index(years).await
    }

    async fn read_index(&self) -> Result<Vec<String>> {
        self.inner.read_index().await
    }
}

#[tokio::test]
async fn test_failed_year_does_not_stop_other_years() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/calendar.csv")
        .with_status(200)
        .with_body(CALENDAR_CSV)
        .create_async()
        .await;

    let scratch = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let source = source(format!("{}/calendar.csv", server.url()), &scratch);
    let client = create_download_client(&source).unwrap();
    let storage = FlakyStorage {
        inner: LocalStorage::new(out.path()),
        broken: HashMap::from([("2024".to_string(), "disk full".to_string())]),
    };

    let report = run_fetch(&source, &storage, &client).await.unwrap();

    assert_eq!(report.stage, PipelineStage::Done);
    assert_eq!(report.years_written, vec!["2025"]);
    assert_eq!(report.years_failed.len(), 1);
    assert_eq!(report.years_failed[0].0, "2024");
    assert_eq!(report.index_years.as_deref(), Some(&["2025".to_string()][..]));
    assert!(out.path().join("2025.json").exists());
    assert!(!out.path().join("2024.json").exists());
    assert!(is_empty_dir(&scratch));
}

#[tokio::test]
async fn test_reader_sees_new_run_after_invalidate() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/first.csv")
        .with_status(200)
        .with_body(CALENDAR_CSV)
        .create_async()
        .await;
    server
        .mock("GET", "/second.csv")
        .with_status(200)
        .with_body(
            "Date,name,isHoliday,holidayCategory,description\n\
             20241010,國慶日,是,放假之紀念日及節日,\n",
        )
        .create_async()
        .await;

    let scratch = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let storage = LocalStorage::new(out.path());
    let reader = HolidayReader::new(storage.clone(), Duration::from_secs(300));

    let first = source(format!("{}/first.csv", server.url()), &scratch);
    let client = create_download_client(&first).unwrap();
    run_fetch(&first, &storage, &client).await.unwrap();
    assert_eq!(reader.holidays_for_year("2024").await.unwrap().len(), 3);

    let second = source(format!("{}/second.csv", server.url()), &scratch);
    run_fetch(&second, &storage, &client).await.unwrap();
    assert_eq!(reader.holidays_for_year("2024").await.unwrap().len(), 3);

    reader.invalidate();
    let records = reader.holidays_for_year("2024").await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "國慶日");
    assert_eq!(reader.years().await.unwrap(), vec!["2025", "2024"]);
}
