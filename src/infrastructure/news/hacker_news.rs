use async_trait::async_trait;
use chrono::DateTime;
use futures::future::join_all;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{NewsAdapter, RawFeed, endpoint, get_json, non_blank};
use crate::domain::{FetchError, NewsItem, NewsSource};
use crate::infrastructure::cancel::CancelSignal;

const ITEM_PAGE: &str = "https://news.ycombinator.com/item?id=";

pub struct HackerNewsAdapter {
    http: Client,
    base: Url,
}

impl HackerNewsAdapter {
    pub fn new(http: Client, base: Url) -> Self {
        Self { http, base }
    }

    /// `None` on any failure, so one bad item never sinks the batch.
    async fn fetch_item(&self, id: u64, signal: &CancelSignal) -> Option<Item> {
        let url = endpoint(
            &self.base,
            &format!("v0/item/{id}.json"),
            NewsSource::HackerNews,
        )
        .ok()?;

        match get_json::<Option<Item>>(&self.http, url, NewsSource::HackerNews, signal).await {
            Ok(item) => item,
            Err(FetchError::Cancelled) => None,
            Err(err) => {
                warn!(id, error = %err, "failed to fetch hacker news item");
                None
            }
        }
    }
}

#[async_trait]
impl NewsAdapter for HackerNewsAdapter {
    fn source(&self) -> NewsSource {
        NewsSource::HackerNews
    }

    async fn fetch(
        &self,
        limit: usize,
        signal: &CancelSignal,
    ) -> Result<Vec<NewsItem>, FetchError> {
        let url = endpoint(&self.base, "v0/topstories.json", NewsSource::HackerNews)?;
        let ids: Vec<u64> = get_json(&self.http, url, NewsSource::HackerNews, signal).await?;

        let fetches = ids
            .into_iter()
            .take(limit)
            .map(|id| self.fetch_item(id, signal));
        let items: Vec<Item> = join_all(fetches).await.into_iter().flatten().collect();

        if signal.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let items = RawFeed::HackerNews(items).normalize();
        debug!(count = items.len(), "fetched hacker news stories");
        Ok(items)
    }
}

#[derive(Debug, Deserialize)]
pub struct Item {
    id: Option<u64>,
    title: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    url: Option<String>,
    time: Option<i64>,
}

impl Item {
    pub(crate) fn into_item(self) -> Option<NewsItem> {
        let id = self.id?;
        let title = non_blank(self.title)?;
        let published_at = DateTime::from_timestamp(self.time?, 0)?;
        let description = non_blank(self.text).unwrap_or_else(|| title.clone());
        let url = non_blank(self.url).unwrap_or_else(|| format!("{ITEM_PAGE}{id}"));

        Some(NewsItem {
            id: NewsSource::HackerNews.item_id(id),
            title,
            description,
            url,
            source: NewsSource::HackerNews,
            published_at,
        })
    }
}
