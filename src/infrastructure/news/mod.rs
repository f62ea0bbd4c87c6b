pub mod aggregator;
pub mod devto;
pub mod hacker_news;
pub mod reddit;

pub use aggregator::Aggregator;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::domain::{FetchError, NewsItem, NewsSource};
use crate::infrastructure::cancel::CancelSignal;
use crate::infrastructure::parse_base_url;

pub const REDDIT_URL: &str = "https://www.reddit.com";
pub const HACKER_NEWS_URL: &str = "https://hacker-news.firebaseio.com";
pub const DEVTO_URL: &str = "https://dev.to";

/// Base URLs of the news providers. Overridable so tests can point at a mock server.
#[derive(Debug, Clone)]
pub struct NewsEndpoints {
    pub reddit: Url,
    pub hacker_news: Url,
    pub devto: Url,
}

impl NewsEndpoints {
    pub fn new(reddit: &str, hacker_news: &str, devto: &str) -> anyhow::Result<Self> {
        let parse = |raw: &str| parse_base_url(raw).context("invalid news endpoint");
        Ok(Self {
            reddit: parse(reddit)?,
            hacker_news: parse(hacker_news)?,
            devto: parse(devto)?,
        })
    }

    /// Every provider served from the same origin (used by tests).
    pub fn single(base: &str) -> anyhow::Result<Self> {
        Self::new(base, base, base)
    }
}

impl Default for NewsEndpoints {
    #[allow(clippy::expect_used)] // Constants are valid URLs
    fn default() -> Self {
        Self::new(REDDIT_URL, HACKER_NEWS_URL, DEVTO_URL).expect("default news endpoints are valid")
    }
}

/// Fetches one provider's listing and normalizes it into [`NewsItem`]s.
#[async_trait]
pub trait NewsAdapter: Send + Sync {
    fn source(&self) -> NewsSource;

    async fn fetch(&self, limit: usize, signal: &CancelSignal)
    -> Result<Vec<NewsItem>, FetchError>;
}

/// Provider-specific payloads before normalization.
#[derive(Debug)]
pub enum RawFeed {
    Reddit(reddit::Listing),
    HackerNews(Vec<hacker_news::Item>),
    DevTo(Vec<devto::Article>),
}

impl RawFeed {
    /// Convert to [`NewsItem`]s, dropping records that miss required fields.
    pub fn normalize(self) -> Vec<NewsItem> {
        match self {
            RawFeed::Reddit(listing) => listing
                .into_posts()
                .filter_map(reddit::Post::into_item)
                .collect(),
            RawFeed::HackerNews(items) => items
                .into_iter()
                .filter_map(hacker_news::Item::into_item)
                .collect(),
            RawFeed::DevTo(articles) => articles
                .into_iter()
                .filter_map(devto::Article::into_item)
                .collect(),
        }
    }
}

pub(crate) fn endpoint(base: &Url, path: &str, provider: NewsSource) -> Result<Url, FetchError> {
    base.join(path).map_err(|e| FetchError::Transport {
        provider,
        message: format!("invalid URL {path}: {e}"),
    })
}

/// GET `url` and decode a JSON body, mapping each failure onto [`FetchError`].
pub(crate) async fn get_json<T>(
    http: &Client,
    url: Url,
    provider: NewsSource,
    signal: &CancelSignal,
) -> Result<T, FetchError>
where
    T: DeserializeOwned,
{
    signal
        .guard(async {
            let response = http
                .get(url)
                .send()
                .await
                .map_err(|e| FetchError::Transport {
                    provider,
                    message: e.to_string(),
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    provider,
                    status: status.as_u16(),
                });
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| FetchError::Transport {
                    provider,
                    message: e.to_string(),
                })?;

            serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode {
                provider,
                message: e.to_string(),
            })
        })
        .await
}

/// Empty or whitespace-only strings count as missing.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
