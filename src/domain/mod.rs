pub mod errors;
pub mod news;
pub mod resume;
pub mod storage;

// Re-exports
pub use errors::{FetchError, StoreError};
pub use news::{NewsFeed, NewsItem, NewsSource, SourceSelector, SourceState, SourceStatus};
pub use resume::{ResumeFile, ResumeId, ResumeUpdate, StoredResume};
pub use storage::KeyValueStore;
