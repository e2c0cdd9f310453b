use graphcheck_http::HttpError;
use graphcheck_model::{HeaderShapeError, ModelError};
use thiserror::Error;

/// Why a single scenario failed
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("{0}")]
    Assertion(String),

    #[error("expected status {expected}, got {actual}: {body}")]
    UnexpectedStatus {
        expected: u16,
        actual: u16,
        body: String,
    },

    #[error(transparent)]
    HeaderShape(#[from] HeaderShapeError),

    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("No value stored for {0}")]
    MissingValue(String),
}

impl ScenarioError {
    pub fn assertion(detail: impl Into<String>) -> Self {
        ScenarioError::Assertion(detail.into())
    }

    /// The target went away; continuing the run would only repeat this
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ScenarioError::Http(e) if e.is_unreachable())
    }
}

pub type ScenarioResult<T> = Result<T, ScenarioError>;

/// Errors that stop a whole run
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Target service unreachable: {0}")]
    Unreachable(String),

    #[error("Target probe failed: {0}")]
    Probe(HttpError),

    #[error("No scenarios match filter {filter:?}")]
    NoScenarios { filter: Option<String> },

    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<HttpError> for RunnerError {
    fn from(err: HttpError) -> Self {
        if err.is_unreachable() {
            RunnerError::Unreachable(err.to_string())
        } else {
            RunnerError::Probe(err)
        }
    }
}
