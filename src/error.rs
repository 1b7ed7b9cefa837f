use thiserror::Error;

/// Errors from the geocoding and spatial query services
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Request failed or timed out
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    #[error("rate limit exceeded")]
    RateLimited,

    /// Geocoder returned no match
    #[error("no results")]
    EmptyResult,

    /// Response body did not have the expected JSON shape
    #[error("malformed response: {message}")]
    MalformedResponse { message: String },
}

impl ServiceError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }
}

impl From<simd_json::Error> for ServiceError {
    fn from(err: simd_json::Error) -> Self {
        Self::malformed(err.to_string())
    }
}

/// Category key not present in the registry
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);
