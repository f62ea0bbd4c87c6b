use std::time::Duration;

use careerdash::application::routes::app_router;
use careerdash::application::services::NewsPolicy;
use careerdash::application::state::{AppState, AppStateConfig};
use careerdash::infrastructure::news::NewsEndpoints;
use reqwest::{Client, Url};
use tokio::net::TcpListener;
use tokio::task::AbortHandle;
use wiremock::MockServer;

pub const TEST_ORIGIN: &str = "https://dashboard.test";

pub struct TestApp {
    pub address: String,
    /// Stands in for the proxied backend.
    pub upstream: MockServer,
    /// Serves Reddit, Hacker News and Dev.to from one origin.
    pub providers: MockServer,
    pub client: Client,
    server_handle: AbortHandle,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}

pub async fn spawn_app() -> TestApp {
    let upstream = MockServer::start().await;
    let upstream_url = upstream.uri();
    spawn_app_inner(upstream, &upstream_url).await
}

/// Proxy to `upstream_url` instead of the mock backend.
pub async fn spawn_app_with_upstream(upstream_url: &str) -> TestApp {
    let upstream = MockServer::start().await;
    spawn_app_inner(upstream, upstream_url).await
}

async fn spawn_app_inner(upstream: MockServer, upstream_url: &str) -> TestApp {
    let providers = MockServer::start().await;

    let state = AppState::new(AppStateConfig {
        upstream_url: Url::parse(upstream_url).expect("valid upstream URL"),
        allowed_origin: TEST_ORIGIN.to_string(),
        endpoints: NewsEndpoints::single(&providers.uri()).expect("valid provider URL"),
        news_policy: NewsPolicy {
            retry_delay: Duration::ZERO,
            ..NewsPolicy::default()
        },
    })
    .expect("Failed to build app state");

    let app = app_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");

    let local_addr = listener.local_addr().expect("Failed to get local address");
    let address = format!("http://{}", local_addr);

    let server_handle = tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
        )
        .await
        .expect("Server failed to start");
    })
    .abort_handle();

    TestApp {
        address,
        upstream,
        providers,
        client: Client::new(),
        server_handle,
    }
}

/// Assert the four CORS headers every response carries.
pub fn assert_cors_headers(response: &reqwest::Response) {
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], TEST_ORIGIN);
    assert_eq!(
        headers["access-control-allow-methods"],
        "GET, POST, PUT, DELETE, OPTIONS"
    );
    assert_eq!(
        headers["access-control-allow-headers"],
        "Content-Type, Authorization, X-Requested-With"
    );
    assert_eq!(headers["access-control-allow-credentials"], "true");
}
