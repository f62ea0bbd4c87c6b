use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use super::{NewsAdapter, RawFeed, endpoint, get_json, non_blank};
use crate::domain::{FetchError, NewsItem, NewsSource};
use crate::infrastructure::cancel::CancelSignal;

const SUBREDDIT: &str = "programming";
const PERMALINK_ORIGIN: &str = "https://reddit.com";

pub struct RedditAdapter {
    http: Client,
    base: Url,
}

impl RedditAdapter {
    pub fn new(http: Client, base: Url) -> Self {
        Self { http, base }
    }
}

#[async_trait]
impl NewsAdapter for RedditAdapter {
    fn source(&self) -> NewsSource {
        NewsSource::Reddit
    }

    async fn fetch(
        &self,
        limit: usize,
        signal: &CancelSignal,
    ) -> Result<Vec<NewsItem>, FetchError> {
        let mut url = endpoint(&self.base, &format!("r/{SUBREDDIT}.json"), NewsSource::Reddit)?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());

        let listing: Listing = get_json(&self.http, url, NewsSource::Reddit, signal).await?;
        let items = RawFeed::Reddit(listing).normalize();
        debug!(count = items.len(), "fetched reddit posts");
        Ok(items)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Listing {
    #[serde(default)]
    data: Option<ListingData>,
}

#[derive(Debug, Default, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

impl Listing {
    pub(crate) fn into_posts(self) -> impl Iterator<Item = Post> {
        self.data
            .unwrap_or_default()
            .children
            .into_iter()
            .map(|child| child.data)
    }
}

#[derive(Debug, Deserialize)]
pub struct Post {
    id: Option<String>,
    title: Option<String>,
    #[serde(default)]
    selftext: Option<String>,
    permalink: Option<String>,
    created_utc: Option<f64>,
}

impl Post {
    pub(crate) fn into_item(self) -> Option<NewsItem> {
        let id = non_blank(self.id)?;
        let title = non_blank(self.title)?;
        let permalink = non_blank(self.permalink)?;
        let published_at = DateTime::from_timestamp(self.created_utc?.trunc() as i64, 0)?;
        let description = non_blank(self.selftext).unwrap_or_else(|| title.clone());

        Some(NewsItem {
            id: NewsSource::Reddit.item_id(id),
            title,
            description,
            url: format!("{PERMALINK_ORIGIN}{permalink}"),
            source: NewsSource::Reddit,
            published_at,
        })
    }
}
