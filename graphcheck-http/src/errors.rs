//! HTTP error types

use crate::types::HttpMethodError;

/// Error type for HTTP operations
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// Connection refused or timed out; the target is not running
    #[error("Target service unreachable at {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(#[from] HttpMethodError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Unexpected status {status} from {url}")]
    UnexpectedStatus { url: String, status: u16 },
}

impl HttpError {
    /// Classify a transport failure; connect and timeout errors mean the
    /// target is not there at all.
    pub fn from_transport(err: reqwest::Error, url: &str) -> Self {
        if err.is_connect() || err.is_timeout() {
            HttpError::Unreachable {
                url: url.to_string(),
                reason: err.to_string(),
            }
        } else {
            HttpError::NetworkError(err)
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, HttpError::Unreachable { .. })
    }
}
