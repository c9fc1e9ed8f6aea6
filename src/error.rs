// src/error.rs

//! Unified error handling for the holiday feed.

use std::fmt;

use thiserror::Error;

/// Result type alias for holiday feed operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// CSV reader failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Source download failed (network, timeout, bad URL)
    #[error("Download failed for {url}: {message}")]
    Download { url: String, message: String },

    /// Malformed CSV row or date field
    #[error("Parse error at line {line}: {message}")]
    Parse { line: u64, message: String },

    /// Requested document does not exist or could not be read
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a download error for the given source URL.
    pub fn download(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Download {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a parse error pointing at a CSV line.
    pub fn parse(line: u64, message: impl fmt::Display) -> Self {
        Self::Parse {
            line,
            message: message.to_string(),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
