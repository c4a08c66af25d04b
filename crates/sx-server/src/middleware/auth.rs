//! API key middleware.
//!
//! Every request under `/api` that is not a GET must carry the configured
//! secret in the `X-API-KEY` header. The check runs before routing and body
//! extraction, so a missing key wins over every other validation error.

use axum::body::Body;
use axum::extract::State;
use axum::http::{Method, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::Rng;
use sx_core::config::AuthConfig;

use crate::context::AppContext;
use crate::error::AppError;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Reject non-GET requests that lack a valid API key.
pub async fn api_key_middleware(
    State(ctx): State<AppContext>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() == Method::GET {
        return next.run(request).await;
    }

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if !is_authorized(&ctx.config.auth, provided) {
        tracing::warn!(
            method = %request.method(),
            path = %request.uri().path(),
            "Rejected request without a valid API key"
        );
        return AppError::from(sx_core::Error::InvalidApiKey).into_response();
    }

    next.run(request).await
}

/// `true` when `provided` matches the configured key. With no key configured
/// nothing is authorized.
pub fn is_authorized(auth: &AuthConfig, provided: Option<&str>) -> bool {
    match (auth.api_key.as_deref(), provided) {
        (Some(expected), Some(provided)) => !expected.is_empty() && provided == expected,
        _ => false,
    }
}

/// Generate a random API key
pub fn generate_api_key() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    URL_SAFE_NO_PAD.encode(bytes)
}
