// src/models/mod.rs

//! Domain models for the holiday feed.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod alert;
mod config;
mod holiday;

// Re-export all public types
pub use alert::{AlertEntry, AlertFeed, AlertSummary};
pub use config::{Config, OutputConfig, ReaderConfig, RealtimeConfig, SourceConfig};
pub use holiday::{HolidayRecord, is_valid_date};
