use anyhow::{Result, bail};
use clap::Args;
use serde_json::json;

use super::{http_client, parse_base_url, print_json};
use crate::infrastructure::health::{is_backend_running, probe_backend};

#[derive(Debug, Args)]
pub struct HealthCommand {
    /// Also check the news sources and latest-news endpoints
    #[arg(long)]
    pub full: bool,
}

pub async fn run(backend_url: &str, command: HealthCommand) -> Result<()> {
    let base_url = parse_base_url(backend_url)?;
    let client = http_client()?;

    if command.full {
        let report = probe_backend(&client, &base_url).await;
        print_json(&report)?;
        if !report.success {
            bail!("backend connection test failed");
        }
        return Ok(());
    }

    let running = is_backend_running(&client, &base_url).await;
    print_json(&json!({ "url": base_url.as_str(), "running": running }))?;
    if !running {
        bail!("backend at {base_url} is not reachable");
    }
    Ok(())
}
