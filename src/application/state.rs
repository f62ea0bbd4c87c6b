use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::HeaderValue;
use reqwest::Url;

use crate::application::services::{NewsPolicy, NewsService};
use crate::infrastructure::news::{Aggregator, NewsEndpoints};

pub const DEFAULT_UPSTREAM_URL: &str = "https://zettanix.in";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "https://quiz-new-j3wl.vercel.app";

/// Shared outbound request timeout.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything that varies between production and test environments.
pub struct AppStateConfig {
    pub upstream_url: Url,
    pub allowed_origin: String,
    pub endpoints: NewsEndpoints,
    pub news_policy: NewsPolicy,
}

#[derive(Clone)]
pub struct AppState {
    pub http_client: reqwest::Client,
    pub upstream: Url,
    /// Host label used in proxy error details.
    pub upstream_host: String,
    pub cors_origin: HeaderValue,
    pub news: NewsService,
}

impl AppState {
    pub fn new(config: AppStateConfig) -> anyhow::Result<Self> {
        let http_client = reqwest::ClientBuilder::new()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        let cors_origin = HeaderValue::from_str(&config.allowed_origin)
            .with_context(|| format!("invalid allowed origin: {}", config.allowed_origin))?;

        let upstream_host = config
            .upstream_url
            .host_str()
            .map(str::to_string)
            .unwrap_or_else(|| config.upstream_url.to_string());

        let aggregator = Aggregator::from_endpoints(&http_client, &config.endpoints);
        let news = NewsService::new(Arc::new(aggregator), config.news_policy);

        Ok(Self {
            http_client,
            upstream: config.upstream_url,
            upstream_host,
            cors_origin,
            news,
        })
    }
}
