use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use crate::domain::FetchError;

/// JSON body returned for every handled error.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    fn status_and_label(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::Fetch(FetchError::Cancelled) => {
                (StatusCode::SERVICE_UNAVAILABLE, "fetch_cancelled")
            }
            AppError::Fetch(_) => (StatusCode::BAD_GATEWAY, "fetch_failed"),
        }
    }
}

/// Handler-facing wrapper that renders an [`AppError`] as a JSON response.
#[derive(Debug)]
pub struct ApiError(AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        Self(AppError::from(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, label) = self.0.status_and_label();
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        } else {
            warn!(error = %self.0, "request rejected");
        }

        let body = ErrorResponse {
            error: label.to_string(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
