//! Realtime alert feed structures.

use serde::{Deserialize, Serialize};

/// Top-level alert feed document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertFeed {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub updated: Option<String>,

    /// Feed entries, in feed order
    #[serde(default, rename = "entry")]
    pub entries: Vec<AlertEntry>,
}

/// One alert entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertEntry {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub updated: Option<String>,

    #[serde(default)]
    pub summary: Option<AlertSummary>,
}

/// Summary block carrying the free text of an alert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSummary {
    /// Markup type declared by the feed (usually "html")
    #[serde(default, rename = "@type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, rename = "#text", alias = "text")]
    pub text: Option<String>,
}

impl AlertEntry {
    /// The summary text, if the entry carries any.
    pub fn summary_text(&self) -> Option<&str> {
        self.summary.as_ref()?.text.as_deref()
    }

    /// Build an entry carrying only a summary text.
    pub fn with_summary(text: impl Into<String>) -> Self {
        Self {
            summary: Some(AlertSummary {
                kind: None,
                text: Some(text.into()),
            }),
            ..Self::default()
        }
    }
}
