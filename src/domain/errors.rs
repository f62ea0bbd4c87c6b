use thiserror::Error;

use crate::domain::news::NewsSource;

/// Failure while fetching or aggregating news.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{provider} request failed: {message}")]
    Transport {
        provider: NewsSource,
        message: String,
    },
    #[error("{provider} API error: {status}")]
    Status { provider: NewsSource, status: u16 },
    #[error("{provider} returned an undecodable body: {message}")]
    Decode {
        provider: NewsSource,
        message: String,
    },
    #[error("no adapter registered for {0}")]
    Unavailable(NewsSource),
    #[error("all news sources failed: {}", .0.join("; "))]
    AllSourcesFailed(Vec<String>),
    #[error("news fetch was cancelled")]
    Cancelled,
}

impl FetchError {
    /// Whether retrying the same fetch could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Cancelled | Self::Unavailable(_))
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage contents are not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}
