use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use super::{NewsAdapter, RawFeed, endpoint, get_json, non_blank};
use crate::domain::{FetchError, NewsItem, NewsSource};
use crate::infrastructure::cancel::CancelSignal;

pub struct DevToAdapter {
    http: Client,
    base: Url,
}

impl DevToAdapter {
    pub fn new(http: Client, base: Url) -> Self {
        Self { http, base }
    }
}

#[async_trait]
impl NewsAdapter for DevToAdapter {
    fn source(&self) -> NewsSource {
        NewsSource::DevTo
    }

    async fn fetch(
        &self,
        limit: usize,
        signal: &CancelSignal,
    ) -> Result<Vec<NewsItem>, FetchError> {
        let mut url = endpoint(&self.base, "api/articles", NewsSource::DevTo)?;
        url.query_pairs_mut()
            .append_pair("per_page", &limit.to_string());

        let articles: Vec<Article> = get_json(&self.http, url, NewsSource::DevTo, signal).await?;
        let items = RawFeed::DevTo(articles).normalize();
        debug!(count = items.len(), "fetched dev.to articles");
        Ok(items)
    }
}

#[derive(Debug, Deserialize)]
pub struct Article {
    id: Option<u64>,
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
}

impl Article {
    pub(crate) fn into_item(self) -> Option<NewsItem> {
        let id = self.id?;
        let title = non_blank(self.title)?;
        let url = non_blank(self.url)?;
        let published_at = DateTime::parse_from_rfc3339(self.published_at.as_deref()?)
            .ok()?
            .with_timezone(&Utc);
        let description = non_blank(self.description).unwrap_or_else(|| title.clone());

        Some(NewsItem {
            id: NewsSource::DevTo.item_id(id),
            title,
            description,
            url,
            source: NewsSource::DevTo,
            published_at,
        })
    }
}
