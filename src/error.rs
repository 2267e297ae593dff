//! Error types for the Spotify dashboard pipeline.

use thiserror::Error;

/// Main error type for all spotiviz operations.
#[derive(Debug, Error)]
pub enum SpotivizError {
    /// No access token available (user not signed in, or token expired).
    #[error("Not signed in: {0}")]
    AuthMissing(String),

    /// The authorization code exchange was rejected.
    #[error("Bad credentials: {0}")]
    BadCredentials(String),

    /// No data returned from the API.
    #[error("No data from API: {0}")]
    NoDataApi(String),

    /// HTTP request failed.
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Generic API error with message.
    #[error("API error: {0}")]
    ApiError(String),
}

/// Result type alias for spotiviz operations.
pub type Result<T> = std::result::Result<T, SpotivizError>;
