use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

use strategy::RegistryError;

/// Failure of a request, rendered as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error(transparent)]
    NotFound(#[from] RegistryError),

    #[error("market data unavailable: {0}")]
    Upstream(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<common::Error> for ApiError {
    fn from(e: common::Error) -> Self {
        match e {
            common::Error::UnsupportedExchange(_) | common::Error::UnsupportedTimeframe(_) => {
                ApiError::BadRequest(e.to_string())
            }
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(error = %self, "Request failed upstream");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
