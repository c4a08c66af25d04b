//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`sx_core::Error`] so that route handlers
//! can return `Result<T, AppError>` and use `?` on store calls.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Body of every error response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError {
    inner: sx_core::Error,
}

impl AppError {
    pub fn new(inner: sx_core::Error) -> Self {
        Self { inner }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.inner.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<sx_core::Error> for AppError {
    fn from(e: sx_core::Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                "Server error in API handler"
            );
        } else if let sx_core::Error::NotFound { ref id } = self.inner {
            tracing::debug!(id = %id, "Image not found");
        }

        let body = ErrorBody {
            error: self.inner.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}
