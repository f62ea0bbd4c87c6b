pub mod cancel;
pub mod health;
pub mod news;
pub mod resume_store;
pub mod storage;

use anyhow::Context;
use reqwest::Url;

/// Parse a base URL, adding a trailing slash so relative joins keep its path.
pub fn parse_base_url(raw: &str) -> anyhow::Result<Url> {
    let mut url = Url::parse(raw).with_context(|| format!("invalid URL: {raw}"))?;
    if !url.path().ends_with('/') {
        url.set_path(&format!("{}/", url.path().trim_end_matches('/')));
    }
    Ok(url)
}
