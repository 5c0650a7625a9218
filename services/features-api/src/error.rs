//! HTTP error responses.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use cityjson_protocol::{media_types, ErrorEnvelope, FeaturesError};
use metrics::counter;
use thiserror::Error;
use tracing::{debug, error};

/// Any error a handler can return.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Features(#[from] FeaturesError),

    #[error("Failed to serialize response: {0}")]
    Render(#[from] serde_json::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Features(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ApiError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Features(e) => e.code(),
            ApiError::Render(_) => "InternalError",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        counter!("features_request_errors_total", "code" => code).increment(1);

        let envelope = match &self {
            ApiError::Features(e) => e.to_envelope(),
            ApiError::Render(e) => {
                error!(error = %e, "Response rendering failed");
                ErrorEnvelope::new(code, self.to_string())
            }
        };
        debug!(status = status.as_u16(), code, "Request failed");

        let body = serde_json::to_string(&envelope).unwrap_or_default();
        (status, [(header::CONTENT_TYPE, media_types::JSON)], body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
