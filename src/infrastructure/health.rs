use std::time::Duration;

use anyhow::{Context, bail};
use reqwest::{Client, Url};
use serde::Serialize;
use tracing::{info, warn};

pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Whether the backend answers `/health` with a success status within [`HEALTH_TIMEOUT`].
pub async fn is_backend_running(client: &Client, base_url: &Url) -> bool {
    let url = match base_url.join("health") {
        Ok(url) => url,
        Err(err) => {
            warn!(error = %err, "invalid backend URL");
            return false;
        }
    };

    match client.get(url).timeout(HEALTH_TIMEOUT).send().await {
        Ok(response) => response.status().is_success(),
        Err(err) => {
            warn!(error = %err, "backend not reachable");
            false
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct ConnectionReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub news: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Walk the backend's health, news-sources and latest-news endpoints in order,
/// stopping at the first failure.
pub async fn probe_backend(client: &Client, base_url: &Url) -> ConnectionReport {
    let mut report = ConnectionReport::default();

    let outcome = async {
        report.health = Some(probe_step(client, base_url, "health", "Health check").await?);
        report.sources =
            Some(probe_step(client, base_url, "api/v1/news/sources", "Sources check").await?);
        report.news =
            Some(probe_step(client, base_url, "api/v1/news/latest?limit=5", "News check").await?);
        anyhow::Ok(())
    }
    .await;

    match outcome {
        Ok(()) => {
            info!("backend connection test completed successfully");
            report.success = true;
        }
        Err(err) => {
            warn!(error = %err, "backend connection test failed");
            report.error = Some(format!("{err:#}"));
        }
    }

    report
}

async fn probe_step(
    client: &Client,
    base_url: &Url,
    path: &str,
    label: &str,
) -> anyhow::Result<serde_json::Value> {
    let url = base_url
        .join(path)
        .with_context(|| format!("invalid backend path: {path}"))?;
    let response = client
        .get(url)
        .timeout(HEALTH_TIMEOUT)
        .send()
        .await
        .with_context(|| format!("{label} request failed"))?;

    let status = response.status();
    if !status.is_success() {
        bail!("{label} failed: {}", status.as_u16());
    }

    let body = response
        .json()
        .await
        .with_context(|| format!("{label} returned invalid JSON"))?;
    info!(step = label, "backend check passed");
    Ok(body)
}
