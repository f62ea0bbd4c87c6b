use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::domain::news::DEFAULT_LIMIT;
use crate::domain::{FetchError, NewsFeed, SourceSelector};
use crate::infrastructure::cancel::CancelSignal;
use crate::infrastructure::news::Aggregator;

/// Freshness and retry settings for [`NewsService`].
#[derive(Debug, Clone, Copy)]
pub struct NewsPolicy {
    /// Served straight from cache while younger than this.
    pub fresh_for: Duration,
    /// Kept as a fallback for failed refreshes until this age, then dropped.
    pub evict_after: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for NewsPolicy {
    fn default() -> Self {
        Self {
            fresh_for: Duration::from_secs(2 * 60),
            evict_after: Duration::from_secs(5 * 60),
            max_retries: 2,
            retry_delay: Duration::from_secs(1),
        }
    }
}

type CacheKey = (SourceSelector, usize);
type Cache = HashMap<CacheKey, CacheSlot>;

struct CachedFeed {
    feed: NewsFeed,
    fetched_at: Instant,
}

#[derive(Default)]
struct CacheSlot {
    entry: Option<CachedFeed>,
    committed_ticket: u64,
    in_flight: usize,
}

impl CacheSlot {
    /// Store `feed` unless a fetch that started later has already been stored.
    fn commit(&mut self, ticket: u64, feed: NewsFeed, now: Instant) -> bool {
        if ticket <= self.committed_ticket {
            return false;
        }
        self.committed_ticket = ticket;
        self.entry = Some(CachedFeed {
            feed,
            fetched_at: now,
        });
        true
    }

    fn feed_younger_than(&self, max_age: Duration) -> Option<NewsFeed> {
        self.entry
            .as_ref()
            .filter(|cached| cached.fetched_at.elapsed() < max_age)
            .map(|cached| cached.feed.clone())
    }

    /// A slot with no feed and no pending refresh carries nothing worth keeping.
    fn is_idle(&self) -> bool {
        self.entry.is_none() && self.in_flight == 0
    }
}

/// Expire entries older than `evict_after` and drop the slots left idle.
fn evict_expired(cache: &mut Cache, evict_after: Duration) {
    for slot in cache.values_mut() {
        if slot
            .entry
            .as_ref()
            .is_some_and(|cached| cached.fetched_at.elapsed() >= evict_after)
        {
            slot.entry = None;
        }
    }
    cache.retain(|_, slot| !slot.is_idle());
}

/// Marks a refresh of one key as pending until dropped, so its slot (and the
/// commit ticket it holds) outlives eviction even if the caller goes away.
struct InFlight<'a> {
    cache: &'a Mutex<Cache>,
    key: CacheKey,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut cache = lock(self.cache);
        if let Some(slot) = cache.get_mut(&self.key) {
            slot.in_flight = slot.in_flight.saturating_sub(1);
            if slot.is_idle() {
                cache.remove(&self.key);
            }
        }
    }
}

fn lock(cache: &Mutex<Cache>) -> MutexGuard<'_, Cache> {
    cache.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cached, retrying front for [`Aggregator`].
#[derive(Clone)]
pub struct NewsService {
    aggregator: Arc<Aggregator>,
    policy: NewsPolicy,
    cache: Arc<Mutex<Cache>>,
    tickets: Arc<AtomicU64>,
}

impl NewsService {
    pub fn new(aggregator: Arc<Aggregator>, policy: NewsPolicy) -> Self {
        Self {
            aggregator,
            policy,
            cache: Arc::new(Mutex::new(HashMap::new())),
            tickets: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Return a fresh cached feed, or fetch a new one.
    pub async fn get(
        &self,
        selector: SourceSelector,
        limit: usize,
        signal: &CancelSignal,
    ) -> Result<NewsFeed, FetchError> {
        if let Some(feed) = self.cached((selector, limit), self.policy.fresh_for) {
            debug!(%selector, limit, "serving cached news");
            return Ok(feed);
        }
        self.refresh(selector, limit, signal).await
    }

    /// Fetch regardless of cache state. On failure, a feed younger than
    /// `evict_after` is served instead of the error.
    pub async fn refresh(
        &self,
        selector: SourceSelector,
        limit: usize,
        signal: &CancelSignal,
    ) -> Result<NewsFeed, FetchError> {
        let key = (selector, limit);
        let (ticket, _in_flight) = self.begin(key);

        match self.fetch_with_retry(selector, limit, signal).await {
            Ok(_) if signal.is_cancelled() => Err(FetchError::Cancelled),
            Ok(feed) => {
                let mut cache = lock(&self.cache);
                let slot = cache.entry(key).or_default();
                if !slot.commit(ticket, feed.clone(), Instant::now()) {
                    debug!(%selector, limit, ticket, "newer news already cached, skipping commit");
                }
                Ok(feed)
            }
            Err(FetchError::Cancelled) => Err(FetchError::Cancelled),
            Err(err) => match self.cached(key, self.policy.evict_after) {
                Some(stale) => {
                    warn!(%selector, limit, error = %err, "refresh failed, serving stale news");
                    Ok(stale)
                }
                None => Err(err),
            },
        }
    }

    /// Drop every cached feed.
    pub fn invalidate_all(&self) {
        let mut cache = lock(&self.cache);
        for slot in cache.values_mut() {
            slot.entry = None;
        }
        cache.retain(|_, slot| !slot.is_idle());
        debug!("news cache invalidated");
    }

    /// Take a commit ticket and pin the key's slot until the refresh ends.
    fn begin(&self, key: CacheKey) -> (u64, InFlight<'_>) {
        let mut cache = lock(&self.cache);
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;
        cache.entry(key).or_default().in_flight += 1;
        (
            ticket,
            InFlight {
                cache: &self.cache,
                key,
            },
        )
    }

    fn cached(&self, key: CacheKey, max_age: Duration) -> Option<NewsFeed> {
        let mut cache = lock(&self.cache);
        evict_expired(&mut cache, self.policy.evict_after);
        cache.get(&key)?.feed_younger_than(max_age)
    }

    #[cfg(test)]
    fn slot_count(&self) -> usize {
        lock(&self.cache).len()
    }

    async fn fetch_with_retry(
        &self,
        selector: SourceSelector,
        limit: usize,
        signal: &CancelSignal,
    ) -> Result<NewsFeed, FetchError> {
        let mut attempt = 0;
        loop {
            match self.aggregator.fetch(selector, limit, signal).await {
                Ok(feed) => return Ok(feed),
                Err(err) if err.is_retryable() && attempt < self.policy.max_retries => {
                    attempt += 1;
                    warn!(%selector, attempt, error = %err, "news fetch failed, retrying");
                    let delay = self.policy.retry_delay;
                    signal
                        .guard(async {
                            tokio::time::sleep(delay).await;
                            Ok(())
                        })
                        .await?;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Refreshes the default "all" feed every `every` until `signal` fires.
/// Spawn with `tokio::spawn`.
pub async fn news_refresh_task(news: NewsService, every: Duration, signal: CancelSignal) {
    let mut interval = tokio::time::interval(every);
    // The first tick completes immediately; the feed is fetched on demand until the next one.
    interval.tick().await;
    loop {
        tokio::select! {
            biased;
            () = signal.cancelled() => break,
            _ = interval.tick() => {}
        }
        match news.refresh(SourceSelector::All, DEFAULT_LIMIT, &signal).await {
            Ok(feed) => info!(count = feed.total_results, "news refreshed in background"),
            Err(FetchError::Cancelled) => break,
            Err(err) => warn!(error = %err, "background news refresh failed"),
        }
    }
    debug!("news refresh task stopped");
}
