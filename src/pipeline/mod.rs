//! Pipeline entry points for holiday ingestion.
//!
//! - `run_fetch`: Download the calendar CSV and rebuild the year documents
//! - `run_process`: Re-annotate year documents already on disk

pub mod fetch;
pub mod process;

use std::fmt;

use serde::Serialize;

pub use fetch::{FetchReport, run_fetch};
pub use process::{ProcessReport, run_process};

/// Stages of an ingestion run.
///
/// `Idle -> Downloading -> Parsing -> Resolving -> Writing -> Cleanup -> Done`,
/// or `Failed` after cleanup when downloading or parsing fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    Idle,
    Downloading,
    Parsing,
    Resolving,
    Writing,
    Cleanup,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Downloading => "downloading",
            Self::Parsing => "parsing",
            Self::Resolving => "resolving",
            Self::Writing => "writing",
            Self::Cleanup => "cleanup",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
