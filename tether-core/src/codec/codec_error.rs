use thiserror::Error;

/// Every variant means the candidate is malformed; callers drop the
/// candidate and keep negotiating.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CandidateError {
    #[error("candidate has {0} fields, expected at least 6")]
    TooFewFields(usize),

    #[error("candidate field `{field}` is not a valid number: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("candidate is missing `{0}`")]
    MissingField(&'static str),

    #[error("sdpMLineIndex is not an unsigned integer: {0}")]
    InvalidLineIndex(String),

    #[error("embedded candidate init is not valid JSON: {0}")]
    InvalidInit(String),
}
