use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use reqwest::Url;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use crate::application::routes::app_router;
use crate::application::services::{NewsPolicy, news_refresh_task};
use crate::application::state::{AppState, AppStateConfig};
use crate::infrastructure::cancel::cancellation;
use crate::infrastructure::news::NewsEndpoints;

pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub upstream_url: Url,
    pub allowed_origin: String,
    pub endpoints: NewsEndpoints,
    /// Background refresh period for the default feed; `None` fetches on demand only.
    pub news_refresh: Option<Duration>,
}

pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let state = AppState::new(AppStateConfig {
        upstream_url: config.upstream_url.clone(),
        allowed_origin: config.allowed_origin.clone(),
        endpoints: config.endpoints,
        news_policy: NewsPolicy::default(),
    })?;

    let listener = TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_address))?;

    let (refresh_handle, refresh_signal) = cancellation();
    if let Some(every) = config.news_refresh {
        info!(every_secs = every.as_secs(), "starting background news refresh");
        tokio::spawn(news_refresh_task(state.news.clone(), every, refresh_signal));
    }

    let app = app_router(state);

    info!(
        address = %config.bind_address,
        upstream = %config.upstream_url,
        origin = %config.allowed_origin,
        "starting HTTP server"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server terminated unexpectedly")?;

    refresh_handle.cancel();

    info!("server shutdown complete");

    Ok(())
}

#[allow(clippy::expect_used)] // Startup: panicking is appropriate if signal handlers fail
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
