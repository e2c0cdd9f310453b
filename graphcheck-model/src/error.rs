use crate::kind::ResourceKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Malformed {kind} response: {reason}")]
    MalformedResponse { kind: ResourceKind, reason: String },

    #[error("Response carries no errorMessages list")]
    MissingErrorMessages,

    #[error("Unknown resource kind: {0}")]
    UnknownKind(String),

    #[error("Field {field} cannot be rendered as XML")]
    UnsupportedXmlField { field: String },
}

impl ModelError {
    pub fn malformed(kind: ResourceKind, reason: impl Into<String>) -> Self {
        ModelError::MalformedResponse {
            kind,
            reason: reason.into(),
        }
    }
}
