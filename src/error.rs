use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Request-level failures. Upstream inference failures are deliberately not
/// represented here: the scan endpoint degrades to a mock verdict instead of
/// erroring (see `routes::scan_handler`).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No image provided")]
    NoImage,
    #[error("Unsupported file type: {0}")]
    NotAnImage(String),
    #[error("Free scan quota exhausted")]
    QuotaExceeded,
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NoImage | ApiError::NotAnImage(_) => StatusCode::BAD_REQUEST,
            ApiError::QuotaExceeded => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}
