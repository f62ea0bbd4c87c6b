pub mod health;
pub mod news;
pub mod resume;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use health::HealthCommand;
use news::NewsCommand;
use resume::ResumeCommands;

use crate::application::state::{DEFAULT_ALLOWED_ORIGIN, DEFAULT_UPSTREAM_URL, HTTP_TIMEOUT};
use crate::domain::KeyValueStore;
pub use crate::infrastructure::parse_base_url;

use crate::infrastructure::news::{DEVTO_URL, HACKER_NEWS_URL, NewsEndpoints, REDDIT_URL};
use crate::infrastructure::resume_store::ResumeStore;
use crate::infrastructure::storage::FileStore;

#[derive(Debug, Parser)]
#[command(author, version, about = "Proxy, news feed and resume cache for the career dashboard", long_about = None)]
pub struct Cli {
    /// JSON file backing the local key-value store
    #[arg(
        long,
        global = true,
        env = "CAREERDASH_STORE",
        default_value = "careerdash-store.json"
    )]
    pub store_path: PathBuf,

    /// Backend checked by the `health` command
    #[arg(
        long,
        global = true,
        env = "CAREERDASH_BACKEND_URL",
        default_value = "http://localhost:8000"
    )]
    pub backend_url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeCommand),

    /// Fetch the aggregated news feed
    News(NewsCommand),

    /// Manage the locally cached resume
    Resume {
        #[command(subcommand)]
        command: ResumeCommands,
    },

    /// Check that the backend is reachable
    Health(HealthCommand),
}

#[derive(Debug, Args)]
pub struct ServeCommand {
    #[arg(long, env = "CAREERDASH_BIND_ADDRESS", default_value = "127.0.0.1:3000")]
    pub bind_address: SocketAddr,

    /// Origin every `/api/*` request is forwarded to
    #[arg(long, env = "CAREERDASH_UPSTREAM_URL", default_value = DEFAULT_UPSTREAM_URL)]
    pub upstream_url: String,

    /// Value of `Access-Control-Allow-Origin` on every response
    #[arg(long, env = "CAREERDASH_ALLOWED_ORIGIN", default_value = DEFAULT_ALLOWED_ORIGIN)]
    pub allowed_origin: String,

    /// Refresh the default news feed in the background every N seconds
    #[arg(long, env = "CAREERDASH_NEWS_REFRESH_SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub news_refresh_secs: Option<u64>,

    #[command(flatten)]
    pub endpoints: EndpointArgs,
}

/// Provider base URLs, overridable for testing against local mocks.
#[derive(Debug, Clone, Args)]
pub struct EndpointArgs {
    #[arg(long, env = "CAREERDASH_REDDIT_URL", default_value = REDDIT_URL)]
    pub reddit_url: String,

    #[arg(long, env = "CAREERDASH_HACKER_NEWS_URL", default_value = HACKER_NEWS_URL)]
    pub hacker_news_url: String,

    #[arg(long, env = "CAREERDASH_DEVTO_URL", default_value = DEVTO_URL)]
    pub devto_url: String,
}

impl EndpointArgs {
    pub fn to_endpoints(&self) -> anyhow::Result<NewsEndpoints> {
        NewsEndpoints::new(&self.reddit_url, &self.hacker_news_url, &self.devto_url)
    }
}

pub(crate) fn http_client() -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("careerdash/", env!("CARGO_PKG_VERSION")))
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("failed to configure HTTP client")
}

pub fn resume_store(path: PathBuf) -> ResumeStore {
    let backing: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(path));
    ResumeStore::new(backing)
}

pub(crate) fn print_json<T>(value: &T) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
