//! Unified error type for sharex.
//!
//! Every crate funnels its failures into [`Error`]. The `Display` output of each
//! variant is exactly the message clients see in the `{"error": ...}` body, and
//! [`Error::http_status`] picks the response status.

use std::fmt;

/// Unified error type covering all failure modes in sharex.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A non-GET request arrived without the configured API key.
    #[error("Invalid API Key.")]
    InvalidApiKey,

    /// Request data failed validation.
    #[error("{0}")]
    Validation(String),

    /// No record exists for the requested image id.
    #[error("Resource not found")]
    NotFound {
        /// The identifier that was looked up.
        id: String,
    },

    /// No route matched the request.
    #[error("Endpoint not found.")]
    EndpointNotFound,

    /// The request body exceeded the configured upload limit.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// The metadata store failed.
    #[error("{source}")]
    Database {
        /// The underlying database error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An I/O operation failed.
    #[error("{source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A stored record could not be encoded or decoded.
    #[error("{source}")]
    Json {
        /// The underlying serde error.
        #[from]
        source: serde_json::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("{0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::InvalidApiKey => 403,
            Error::Validation(_) => 400,
            Error::NotFound { .. } => 404,
            Error::EndpointNotFound => 404,
            Error::PayloadTooLarge(_) => 413,
            Error::Database { .. } => 500,
            Error::Io { .. } => 500,
            Error::Json { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(id: impl fmt::Display) -> Self {
        Error::NotFound { id: id.to_string() }
    }

    /// Validation error for a required request parameter that is absent or unusable.
    pub fn missing_parameter(name: &str) -> Self {
        Error::Validation(format!("Missing `{name}` parameter."))
    }

    /// Convenience constructor for [`Error::Database`].
    pub fn database(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Database {
            source: source.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
