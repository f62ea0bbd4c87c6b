use std::time::Duration;

use anyhow::{Context, Result};
use careerdash::application::{ServerConfig, serve};
use careerdash::presentation::cli::{
    Cli, Commands, ServeCommand, health, news, parse_base_url, resume, resume_store,
};
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before clap parses env vars)
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(cmd) => run_server(cmd).await,
        Commands::News(cmd) => news::run(cmd).await,
        Commands::Resume { command } => resume::run(&resume_store(cli.store_path), command),
        Commands::Health(cmd) => health::run(&cli.backend_url, cmd).await,
    }
}

async fn run_server(command: ServeCommand) -> Result<()> {
    let upstream_url = parse_base_url(&command.upstream_url)
        .context("invalid CAREERDASH_UPSTREAM_URL")?;

    let config = ServerConfig {
        bind_address: command.bind_address,
        upstream_url,
        allowed_origin: command.allowed_origin,
        endpoints: command.endpoints.to_endpoints()?,
        news_refresh: command.news_refresh_secs.map(Duration::from_secs),
    };

    serve(config).await
}

/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("RUST_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}
