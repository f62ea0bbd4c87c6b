use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of providers an "all" fetch spreads its limit across.
pub const SOURCE_COUNT: usize = 3;

/// Items returned when the caller does not ask for a count.
pub const DEFAULT_LIMIT: usize = 10;

/// Largest count a caller may ask for.
pub const MAX_LIMIT: usize = 100;

/// Accept a requested item count between 1 and [`MAX_LIMIT`].
pub fn check_limit(limit: usize) -> Result<usize, String> {
    if (1..=MAX_LIMIT).contains(&limit) {
        Ok(limit)
    } else {
        Err(format!("limit must be between 1 and {MAX_LIMIT}, got {limit}"))
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum NewsSource {
    #[serde(rename = "Reddit")]
    Reddit,
    #[serde(rename = "Hacker News")]
    HackerNews,
    #[serde(rename = "Dev.to")]
    DevTo,
}

impl NewsSource {
    pub fn label(self) -> &'static str {
        match self {
            NewsSource::Reddit => "Reddit",
            NewsSource::HackerNews => "Hacker News",
            NewsSource::DevTo => "Dev.to",
        }
    }

    /// Prefix used to keep item ids unique across providers.
    pub fn id_prefix(self) -> &'static str {
        match self {
            NewsSource::Reddit => "reddit",
            NewsSource::HackerNews => "hn",
            NewsSource::DevTo => "devto",
        }
    }

    pub fn item_id(self, native_id: impl fmt::Display) -> String {
        format!("{}-{native_id}", self.id_prefix())
    }
}

impl fmt::Display for NewsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which providers a fetch should query.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceSelector {
    Reddit,
    HackerNews,
    DevTo,
    #[default]
    All,
}

impl SourceSelector {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceSelector::Reddit => "reddit",
            SourceSelector::HackerNews => "hackernews",
            SourceSelector::DevTo => "devto",
            SourceSelector::All => "all",
        }
    }

    /// The single provider this selector names, or `None` for "all".
    pub fn source(self) -> Option<NewsSource> {
        match self {
            SourceSelector::Reddit => Some(NewsSource::Reddit),
            SourceSelector::HackerNews => Some(NewsSource::HackerNews),
            SourceSelector::DevTo => Some(NewsSource::DevTo),
            SourceSelector::All => None,
        }
    }
}

impl fmt::Display for SourceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceSelector {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reddit" => Ok(SourceSelector::Reddit),
            "hackernews" | "hn" => Ok(SourceSelector::HackerNews),
            "devto" => Ok(SourceSelector::DevTo),
            "all" | "" => Ok(SourceSelector::All),
            other => Err(format!(
                "unknown news source '{other}': expected reddit, hackernews, devto or all"
            )),
        }
    }
}

/// A provider-independent news entry. Every field is populated; records that
/// cannot fill them are dropped during normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub source: NewsSource,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsFeed {
    pub articles: Vec<NewsItem>,
    pub total_results: usize,
    pub source: SourceSelector,
    pub last_updated: DateTime<Utc>,
}

impl NewsFeed {
    pub fn new(source: SourceSelector, articles: Vec<NewsItem>) -> Self {
        Self {
            total_results: articles.len(),
            articles,
            source,
            last_updated: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceState {
    Online,
    Offline,
}

/// Reachability of one provider, as seen by a one-item fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceStatus {
    pub source: NewsSource,
    pub status: SourceState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SourceStatus {
    pub fn online(source: NewsSource) -> Self {
        Self {
            source,
            status: SourceState::Online,
            error: None,
        }
    }

    pub fn offline(source: NewsSource, error: impl ToString) -> Self {
        Self {
            source,
            status: SourceState::Offline,
            error: Some(error.to_string()),
        }
    }
}

/// Per-provider share of `limit` when querying every source.
pub fn per_source_limit(limit: usize) -> usize {
    limit.div_ceil(SOURCE_COUNT)
}

/// Order newest first and keep at most `limit` items. Ties keep their input order.
pub fn merge_latest(mut items: Vec<NewsItem>, limit: usize) -> Vec<NewsItem> {
    items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    items.truncate(limit);
    items
}
