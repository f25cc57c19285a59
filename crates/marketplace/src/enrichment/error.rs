//! Error types for the image analysis client.

use thiserror::Error;

/// Errors that can occur when asking the image analysis service for a
/// listing suggestion.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with an error status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the error body, or the raw body.
        message: String,
    },

    /// Rate limited by the API.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The API key was refused.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The API answered without any candidate text.
    #[error("no analysis returned")]
    EmptyResponse,

    /// The answer did not match the listing suggestion schema.
    #[error("malformed analysis: {0}")]
    Malformed(String),
}

/// Error body returned by the Gemini API.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

/// Nested error details.
#[derive(Debug, serde::Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}
