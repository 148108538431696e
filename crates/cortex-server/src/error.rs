//! Maps `CortexError` onto HTTP status codes per SPEC_FULL §2.2: `Validation` is the
//! caller's fault (400), `Invariant`/`Fatal`/`Database`/`Io`/`Serde` are 500,
//! everything else (`Upstream`, `ScheduleMiss`) the core has already degraded
//! locally and should not normally reach here, but 500 is the safe default.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cortex_core::CortexError;
use serde_json::json;

pub enum ApiError {
    Core(CortexError),
    NotFound(String),
}

impl From<CortexError> for ApiError {
    fn from(err: CortexError) -> Self {
        Self::Core(err)
    }
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
            }
            Self::Core(err) => {
                let status = if err.is_validation() {
                    StatusCode::BAD_REQUEST
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                if status == StatusCode::BAD_REQUEST {
                    tracing::debug!(error = %err, "validation error");
                } else {
                    tracing::error!(error = %err, "request failed");
                }
                (status, Json(json!({ "error": err.to_string() }))).into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
