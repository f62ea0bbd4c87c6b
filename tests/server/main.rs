mod helpers;
mod news_api;
mod proxy_api;
