use std::sync::Arc;

use anyhow::{Result, anyhow};
use clap::Args;
use tracing::warn;

use super::{EndpointArgs, http_client, print_json};
use crate::application::services::{NewsPolicy, NewsService};
use crate::domain::SourceSelector;
use crate::domain::news::{DEFAULT_LIMIT, check_limit};
use crate::infrastructure::cancel::cancellation;
use crate::infrastructure::news::Aggregator;

#[derive(Debug, Args)]
pub struct NewsCommand {
    /// reddit, hackernews, devto or all
    #[arg(long, default_value_t = SourceSelector::All)]
    pub source: SourceSelector,

    /// Number of items, 1 to 100
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,

    /// Report which providers are reachable instead of fetching the feed
    #[arg(long)]
    pub status: bool,

    #[command(flatten)]
    pub endpoints: EndpointArgs,
}

pub async fn run(command: NewsCommand) -> Result<()> {
    let limit = check_limit(command.limit).map_err(|e| anyhow!("invalid --limit: {e}"))?;

    let http = http_client()?;
    let aggregator = Aggregator::from_endpoints(&http, &command.endpoints.to_endpoints()?);

    let (handle, signal) = cancellation();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling news fetch");
            handle.cancel();
        }
    });

    if command.status {
        return print_json(&aggregator.source_status(&signal).await);
    }

    let service = NewsService::new(Arc::new(aggregator), NewsPolicy::default());
    let feed = service.get(command.source, limit, &signal).await?;
    print_json(&feed)
}
