//! Route handlers for the HTTP API.

pub mod health;
pub mod images;
pub mod media;

use crate::error::AppError;

/// Fallback for unmatched paths and unsupported methods on known paths.
pub async fn endpoint_not_found() -> AppError {
    AppError::from(sx_core::Error::EndpointNotFound)
}
