// src/services/alerts.rs

//! Realtime closure alert service.
//!
//! Polls the alert feed and keeps only entries that announce a closure for
//! the whole target city. The feed writes city-wide notices as
//! "[停班停課通知]臺北市:..." and district notices as
//! "[停班停課通知]臺北市北投區:...", so a city-wide notice is one where a
//! spelling of the city name is immediately followed by a colon.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use reqwest::Client;

use crate::error::Result;
use crate::models::{AlertEntry, AlertFeed, RealtimeConfig};
use crate::utils::http::create_feed_client;

const COLONS: [char; 2] = [':', '：'];

/// Classifies alert entries as full-city closure notices for one city.
#[derive(Debug, Clone)]
pub struct CityAlertFilter {
    spellings: Vec<String>,
}

impl CityAlertFilter {
    /// Filter for one city, given every accepted spelling of its name.
    pub fn new(spellings: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            spellings: spellings
                .into_iter()
                .map(Into::<String>::into)
                .filter(|s| !s.trim().is_empty())
                .collect(),
        }
    }

    /// Whether `entry` is a closure notice covering the whole city.
    ///
    /// Entries without summary text never match.
    pub fn is_city_wide(&self, entry: &AlertEntry) -> bool {
        entry
            .summary_text()
            .is_some_and(|text| self.is_city_wide_text(text))
    }

    /// Text form of [`Self::is_city_wide`].
    pub fn is_city_wide_text(&self, text: &str) -> bool {
        if !self.spellings.iter().any(|city| text.contains(city.as_str())) {
            return false;
        }
        self.spellings.iter().any(|city| {
            COLONS
                .iter()
                .any(|colon| text.contains(&format!("{city}{colon}")))
        })
    }

    /// Keep city-wide entries, in feed order.
    pub fn filter(&self, entries: Vec<AlertEntry>) -> Vec<AlertEntry> {
        entries
            .into_iter()
            .filter(|entry| self.is_city_wide(entry))
            .collect()
    }
}

/// Fetches the alert feed and serves filtered, briefly cached results.
pub struct AlertService {
    client: Client,
    feed_url: String,
    filter: CityAlertFilter,
    cache_ttl: Duration,
    cache: Mutex<Option<CachedAlerts>>,
}

struct CachedAlerts {
    fetched_at: Instant,
    alerts: Vec<AlertEntry>,
}

impl AlertService {
    /// Create a service from configuration.
    pub fn new(config: &RealtimeConfig) -> Result<Self> {
        let client = create_feed_client(config)?;
        Ok(Self::with_client(client, config))
    }

    /// Create a service around an existing client.
    pub fn with_client(client: Client, config: &RealtimeConfig) -> Self {
        Self {
            client,
            feed_url: config.feed_url.clone(),
            filter: CityAlertFilter::new(config.city_names.iter().cloned()),
            cache_ttl: Duration::from_secs(config.cache_ttl_secs),
            cache: Mutex::new(None),
        }
    }

    /// Fetch and decode the raw feed.
    pub async fn fetch_feed(&self) -> Result<AlertFeed> {
        let response = self
            .client
            .get(&self.feed_url)
            .send()
            .await?
            .error_for_status()?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Current city-wide closure alerts.
    ///
    /// Never fails: a feed error is logged and reported as no alerts. Only
    /// successful fetches are cached, so an outage is retried on the next
    /// call.
    pub async fn current_alerts(&self) -> Vec<AlertEntry> {
        if let Some(alerts) = self.cached() {
            log::debug!("Serving {} cached alert(s)", alerts.len());
            return alerts;
        }

        match self.fetch_feed().await {
            Ok(feed) => {
                let alerts = self.filter.filter(feed.entries);
                log::info!("Alert feed: {} city-wide closure notice(s)", alerts.len());
                self.store(&alerts);
                alerts
            }
            Err(e) => {
                log::error!("Failed to query alert feed {}: {}", self.feed_url, e);
                Vec::new()
            }
        }
    }

    /// Drop any cached result.
    pub fn invalidate(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            *cache = None;
        }
    }

    fn cached(&self) -> Option<Vec<AlertEntry>> {
        let cache = self.cache.lock().ok()?;
        cache
            .as_ref()
            .filter(|c| c.fetched_at.elapsed() < self.cache_ttl)
            .map(|c| c.alerts.clone())
    }

    fn store(&self, alerts: &[AlertEntry]) {
        if self.cache_ttl.is_zero() {
            return;
        }
        if let Ok(mut cache) = self.cache.lock() {
            *cache = Some(CachedAlerts {
                fetched_at: Instant::now(),
                alerts: alerts.to_vec(),
            });
        }
    }
}
