use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum SnapferryError {
    // Network errors
    #[error("Network timeout: {0}")]
    Timeout(String),

    #[error("Resolver unavailable: {0}")]
    GatewayUnavailable(String),

    // Resolver-level rejections
    #[error("Resolver rejected the URL: {0}")]
    VerificationRejected(String),

    #[error("Search response carried no payload")]
    PayloadMissing,

    // Decode / extraction
    #[error("Could not decode obfuscated payload: {0}")]
    DecodeFailed(String),

    #[error("No media found for the requested URL")]
    NoMediaFound,

    // Parse errors
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    // Everything that should not happen in normal operation
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<wreq::Error> for SnapferryError {
    fn from(err: wreq::Error) -> Self {
        if err.is_timeout() {
            SnapferryError::Timeout(err.to_string())
        } else if err.is_connect() {
            SnapferryError::GatewayUnavailable(format!("Connection failed: {}", err))
        } else {
            SnapferryError::GatewayUnavailable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SnapferryError {
    fn from(err: serde_json::Error) -> Self {
        SnapferryError::InvalidJson(err.to_string())
    }
}

impl From<url::ParseError> for SnapferryError {
    fn from(err: url::ParseError) -> Self {
        SnapferryError::InvalidUrl(err.to_string())
    }
}

/// Type alias for Result with SnapferryError
pub type Result<T> = std::result::Result<T, SnapferryError>;
