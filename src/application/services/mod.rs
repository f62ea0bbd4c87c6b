mod news_feed;

pub use news_feed::{NewsPolicy, NewsService, news_refresh_task};
