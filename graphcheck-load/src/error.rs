use graphcheck_http::HttpError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Target service unreachable: {0}")]
    Unreachable(String),

    #[error("Target probe failed: {0}")]
    Probe(HttpError),

    #[error("Invalid load parameters: {0}")]
    InvalidParameters(String),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<HttpError> for LoadError {
    fn from(err: HttpError) -> Self {
        if err.is_unreachable() {
            LoadError::Unreachable(err.to_string())
        } else {
            LoadError::Probe(err)
        }
    }
}

pub type LoadResult<T> = Result<T, LoadError>;
