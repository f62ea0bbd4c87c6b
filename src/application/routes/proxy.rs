use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

use crate::application::state::AppState;

#[derive(Debug, Error)]
enum ProxyError {
    #[error("request body is not valid JSON: {0}")]
    InvalidBody(serde_json::Error),
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("upstream returned invalid JSON: {0}")]
    Decode(serde_json::Error),
}

/// Body of the 500 returned when forwarding fails.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProxyErrorResponse {
    pub error: String,
    pub message: String,
    pub details: String,
}

/// How an upstream body is relayed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    Text,
    Binary,
}

impl BodyKind {
    fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(content_type) = content_type else {
            return BodyKind::Text;
        };
        let content_type = content_type.to_ascii_lowercase();
        if content_type.contains("application/json") {
            BodyKind::Json
        } else if content_type.starts_with("text/") {
            BodyKind::Text
        } else {
            BodyKind::Binary
        }
    }
}

/// Map the wildcard path and query onto the upstream origin.
pub(crate) fn upstream_url(base: &Url, path: &str, query: &[(String, String)]) -> Url {
    let mut url = base.clone();
    let prefix = base.path().trim_end_matches('/');
    url.set_path(&format!("{prefix}/{}", path.trim_start_matches('/')));

    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query)
        .finish();
    url.set_query((!encoded.is_empty()).then_some(encoded.as_str()));
    url
}

pub(crate) async fn forward_request(
    State(state): State<AppState>,
    method: Method,
    Path(path): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }

    let target = upstream_url(&state.upstream, &path, &query);
    info!(%method, target = %target, "forwarding request");

    match relay(&state, method, target.clone(), &headers, body).await {
        Ok(response) => response,
        Err(err) => {
            error!(error = %err, target = %target, "proxy request failed");
            let body = ProxyErrorResponse {
                error: "Internal server error".to_string(),
                message: err.to_string(),
                details: format!("Failed to proxy request to {}", state.upstream_host),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

async fn relay(
    state: &AppState,
    method: Method,
    target: Url,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let sends_body = method != Method::GET && method != Method::HEAD && !body.is_empty();

    let mut request = state
        .http_client
        .request(method, target)
        .header(CONTENT_TYPE, "application/json")
        .header(ACCEPT, "application/json");

    if let Some(authorization) = headers.get(AUTHORIZATION) {
        request = request.header(AUTHORIZATION, authorization.clone());
    }

    if sends_body {
        let payload: Value = serde_json::from_slice(&body).map_err(ProxyError::InvalidBody)?;
        request = request.json(&payload);
    }

    let upstream = request.send().await?;
    let status = upstream.status();
    let content_type = upstream.headers().get(CONTENT_TYPE).cloned();
    let kind = BodyKind::from_content_type(content_type.as_ref().and_then(|v| v.to_str().ok()));

    let response = match kind {
        BodyKind::Json => {
            let bytes = upstream.bytes().await?;
            if bytes.is_empty() {
                status.into_response()
            } else {
                let value: Value = serde_json::from_slice(&bytes).map_err(ProxyError::Decode)?;
                (status, Json(value)).into_response()
            }
        }
        BodyKind::Text => {
            let text = upstream.text().await?;
            (status, Json(Value::String(text))).into_response()
        }
        BodyKind::Binary => {
            let bytes = upstream.bytes().await?;
            let mut response = (status, bytes).into_response();
            let content_type = content_type
                .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));
            response.headers_mut().insert(CONTENT_TYPE, content_type);
            response
        }
    };

    Ok(response)
}
