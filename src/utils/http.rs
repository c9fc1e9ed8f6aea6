// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::Result;
use crate::models::{RealtimeConfig, SourceConfig};

/// Create the client used to download the holiday CSV.
///
/// Connect and read phases get separate budgets; there is no overall
/// deadline so a slow but steady download can finish.
pub fn create_download_client(config: &SourceConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .read_timeout(Duration::from_secs(config.read_timeout_secs))
        .build()?;
    Ok(client)
}

/// Create the client used to poll the realtime alert feed.
pub fn create_feed_client(config: &RealtimeConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}
