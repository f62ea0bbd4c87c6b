use std::sync::Arc;

use futures::future::join_all;
use reqwest::Client;
use tracing::{info, warn};

use super::devto::DevToAdapter;
use super::hacker_news::HackerNewsAdapter;
use super::reddit::RedditAdapter;
use super::{NewsAdapter, NewsEndpoints};
use crate::domain::news::{merge_latest, per_source_limit};
use crate::domain::{FetchError, NewsFeed, NewsItem, NewsSource, SourceSelector, SourceStatus};
use crate::infrastructure::cancel::CancelSignal;

/// Fans a fetch out to the registered adapters and merges their results.
pub struct Aggregator {
    adapters: Vec<Arc<dyn NewsAdapter>>,
}

impl Aggregator {
    pub fn new(adapters: Vec<Arc<dyn NewsAdapter>>) -> Self {
        Self { adapters }
    }

    pub fn from_endpoints(http: &Client, endpoints: &NewsEndpoints) -> Self {
        Self::new(vec![
            Arc::new(RedditAdapter::new(http.clone(), endpoints.reddit.clone())),
            Arc::new(HackerNewsAdapter::new(
                http.clone(),
                endpoints.hacker_news.clone(),
            )),
            Arc::new(DevToAdapter::new(http.clone(), endpoints.devto.clone())),
        ])
    }

    /// Fetch, merge newest first and truncate to `limit`.
    ///
    /// A single-source selector propagates that source's error. "All" only
    /// fails when every source does.
    #[tracing::instrument(skip(self, signal))]
    pub async fn fetch(
        &self,
        selector: SourceSelector,
        limit: usize,
        signal: &CancelSignal,
    ) -> Result<NewsFeed, FetchError> {
        let items = match selector.source() {
            Some(source) => self.adapter(source)?.fetch(limit, signal).await?,
            None => self.fetch_all(per_source_limit(limit), signal).await?,
        };

        let articles = merge_latest(items, limit);
        info!(count = articles.len(), "news fetched");
        Ok(NewsFeed::new(selector, articles))
    }

    /// Ask every adapter for a single item, concurrently, and report which answered.
    pub async fn source_status(&self, signal: &CancelSignal) -> Vec<SourceStatus> {
        let results = join_all(self.adapters.iter().map(|adapter| adapter.fetch(1, signal))).await;

        self.adapters
            .iter()
            .zip(results)
            .map(|(adapter, result)| match result {
                Ok(_) => SourceStatus::online(adapter.source()),
                Err(err) => {
                    warn!(source = %adapter.source(), error = %err, "news source offline");
                    SourceStatus::offline(adapter.source(), err)
                }
            })
            .collect()
    }

    fn adapter(&self, source: NewsSource) -> Result<&Arc<dyn NewsAdapter>, FetchError> {
        self.adapters
            .iter()
            .find(|adapter| adapter.source() == source)
            .ok_or(FetchError::Unavailable(source))
    }

    /// Settle every adapter before deciding the outcome.
    async fn fetch_all(
        &self,
        per_source: usize,
        signal: &CancelSignal,
    ) -> Result<Vec<NewsItem>, FetchError> {
        let results = join_all(
            self.adapters
                .iter()
                .map(|adapter| adapter.fetch(per_source, signal)),
        )
        .await;

        if signal.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let mut items = Vec::new();
        let mut failures = Vec::new();
        let mut succeeded = false;

        for (adapter, result) in self.adapters.iter().zip(results) {
            match result {
                Ok(mut fetched) => {
                    succeeded = true;
                    items.append(&mut fetched);
                }
                Err(err) => {
                    warn!(source = %adapter.source(), error = %err, "news source failed");
                    failures.push(err.to_string());
                }
            }
        }

        if !succeeded && !failures.is_empty() {
            return Err(FetchError::AllSourcesFailed(failures));
        }

        Ok(items)
    }
}
